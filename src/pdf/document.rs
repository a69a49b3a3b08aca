//! PDF object model reader
//!
//! Parses a PDF byte stream with qpdf and exposes the page sequence, the
//! per-page XObject resources and the encryption state. Encrypted input that
//! needs a user password parses into a locked [`Document`] that can be
//! unlocked with [`Document::try_decrypt`].

use crate::error::{Error, Result};
use qpdf::{
    QPdf, QPdfDictionary, QPdfErrorCode, QPdfObject, QPdfObjectLike, QPdfObjectType, QPdfScalar,
    QPdfStream,
    StreamDecodeLevel,
};
use tracing::debug;

/// Guard against cyclic `/Parent` chains in damaged page trees
const MAX_TREE_DEPTH: usize = 64;

enum ParseState {
    Open(QPdf),
    Locked,
}

/// A parsed PDF document
pub struct Document {
    data: Vec<u8>,
    state: ParseState,
    encrypted: bool,
}

impl Document {
    /// Parse raw PDF bytes.
    ///
    /// A zero-page document is valid. Bytes that are not a PDF fail with
    /// [`Error::Parse`]. An encrypted document whose user password is not
    /// empty is returned locked rather than failing.
    pub fn read(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();

        if data.len() < 4 || &data[0..4] != b"%PDF" {
            return Err(Error::Parse {
                reason: "Not a valid PDF file".to_string(),
            });
        }

        match QPdf::read_from_memory(&data) {
            Ok(qpdf) => {
                let encrypted = qpdf.is_encrypted();
                Ok(Self {
                    data,
                    state: ParseState::Open(qpdf),
                    encrypted,
                })
            }
            Err(e) if matches!(e.error_code(), QPdfErrorCode::InvalidPassword) => {
                debug!("PDF requires a password, parsed as locked");
                Ok(Self {
                    data,
                    state: ParseState::Locked,
                    encrypted: true,
                })
            }
            Err(e) => Err(Error::Parse {
                reason: e.to_string(),
            }),
        }
    }

    /// Whether the source file carries an encryption dictionary
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Whether page access still needs a password
    pub fn is_locked(&self) -> bool {
        matches!(self.state, ParseState::Locked)
    }

    /// Try to unlock the document with a candidate password.
    ///
    /// Returns `Ok(false)` for a wrong password and leaves the document
    /// exactly as it was. Only structural failures are errors.
    pub fn try_decrypt(&mut self, password: &str) -> Result<bool> {
        match QPdf::read_from_memory_encrypted(&self.data, password) {
            Ok(qpdf) => {
                self.state = ParseState::Open(qpdf);
                Ok(true)
            }
            Err(e) if matches!(e.error_code(), QPdfErrorCode::InvalidPassword) => Ok(false),
            Err(e) => Err(Error::Parse {
                reason: e.to_string(),
            }),
        }
    }

    fn handle(&self) -> Result<&QPdf> {
        match &self.state {
            ParseState::Open(qpdf) => Ok(qpdf),
            ParseState::Locked => Err(Error::PasswordRequired),
        }
    }

    /// Number of pages
    pub fn page_count(&self) -> Result<u32> {
        self.handle()?.get_num_pages().map_err(|e| Error::Parse {
            reason: e.to_string(),
        })
    }

    /// Pages in document order
    pub fn pages(&self) -> Result<Vec<Page>> {
        let qpdf = self.handle()?;
        let pages = qpdf.get_pages().map_err(|e| Error::Parse {
            reason: e.to_string(),
        })?;

        Ok(pages
            .into_iter()
            .map(|dict| Page {
                owner: qpdf.clone(),
                dict,
            })
            .collect())
    }
}

/// A page dictionary together with the document that owns it
pub struct Page {
    owner: QPdf,
    dict: QPdfDictionary,
}

impl Page {
    pub(crate) fn from_parts(owner: QPdf, dict: QPdfDictionary) -> Self {
        Self { owner, dict }
    }

    pub(crate) fn owner(&self) -> &QPdf {
        &self.owner
    }

    pub(crate) fn dictionary(&self) -> &QPdfDictionary {
        &self.dict
    }

    /// Effective `/Rotate` value in degrees, including inherited values
    pub fn rotation(&self) -> i64 {
        inherited(&self.dict, "/Rotate")
            .filter(|obj| matches!(obj.get_type(), QPdfObjectType::Integer))
            .map(|obj| QPdfScalar::from(obj).as_i64())
            .unwrap_or(0)
    }

    /// Attribute looked up through the `/Parent` chain
    pub(crate) fn inherited(&self, key: &str) -> Option<QPdfObject> {
        inherited(&self.dict, key)
    }

    /// Entries of the page's `/XObject` resource dictionary
    pub fn resource_entries(&self) -> Vec<ResourceEntry> {
        let Some(resources) = inherited(&self.dict, "/Resources").and_then(as_dictionary) else {
            return Vec::new();
        };
        let Some(xobjects) = resources.get("/XObject").and_then(as_dictionary) else {
            return Vec::new();
        };

        xobjects
            .keys()
            .into_iter()
            .filter_map(|name| {
                let object = xobjects.get(&name)?;
                let stream = matches!(object.get_type(), QPdfObjectType::Stream)
                    .then(|| QPdfStream::from(object));
                Some(ResourceEntry { name, stream })
            })
            .collect()
    }
}

/// One named entry of a page's XObject resources
pub struct ResourceEntry {
    name: String,
    stream: Option<QPdfStream>,
}

impl ResourceEntry {
    /// Resource name including the leading slash, e.g. `/Im1`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this entry is an image XObject
    pub fn is_image(&self) -> bool {
        self.name_value("/Subtype").as_deref() == Some("/Image")
    }

    /// Declared `/Filter` when it is a single name
    pub fn filter(&self) -> Option<String> {
        self.name_value("/Filter")
    }

    /// Declared `/ColorSpace` when it is a single name
    pub fn color_space(&self) -> Option<String> {
        self.name_value("/ColorSpace")
    }

    /// Integer value from the stream dictionary
    pub fn integer(&self, key: &str) -> Option<i64> {
        let stream = self.stream.as_ref()?;
        stream
            .get_dictionary()
            .get(key)
            .filter(|obj| matches!(obj.get_type(), QPdfObjectType::Integer))
            .map(|obj| QPdfScalar::from(obj).as_i64())
    }

    /// Stream data with generalized filters removed.
    ///
    /// Specialized image filters such as DCTDecode are left in place, so a
    /// JPEG image comes back as the original JPEG bytes.
    pub fn raw_data(&self) -> Result<Vec<u8>> {
        let stream = self.stream.as_ref().ok_or_else(|| Error::Parse {
            reason: format!("XObject {} is not a stream", self.name),
        })?;
        let data = stream
            .get_data(StreamDecodeLevel::Generalized)
            .map_err(|e| Error::Parse {
                reason: format!("Failed to read stream {}: {}", self.name, e),
            })?;
        let bytes: &[u8] = data.as_ref();
        Ok(bytes.to_vec())
    }

    fn name_value(&self, key: &str) -> Option<String> {
        let stream = self.stream.as_ref()?;
        stream
            .get_dictionary()
            .get(key)
            .filter(|obj| matches!(obj.get_type(), QPdfObjectType::Name))
            .map(|obj| obj.as_name())
    }
}

fn as_dictionary(object: QPdfObject) -> Option<QPdfDictionary> {
    matches!(object.get_type(), QPdfObjectType::Dictionary).then(|| QPdfDictionary::from(object))
}

/// Look up a page attribute, walking up the page tree for inherited values
fn inherited(page: &QPdfDictionary, key: &str) -> Option<QPdfObject> {
    if let Some(value) = page.get(key) {
        return Some(value);
    }

    let mut node = page.get("/Parent").and_then(as_dictionary)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Some(value) = node.get(key) {
            return Some(value);
        }
        node = node.get("/Parent").and_then(as_dictionary)?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rejects_non_pdf() {
        let result = Document::read(b"hello world".to_vec());
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn test_read_rejects_short_input() {
        let result = Document::read(Vec::new());
        assert!(matches!(result, Err(Error::Parse { .. })));
    }
}
