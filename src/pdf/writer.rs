//! PDF writer
//!
//! Assembles pages copied from one or more source documents into a new PDF,
//! optionally compressing streams and applying password encryption.

use crate::error::{map_qpdf_error, Error, Result};
use crate::pdf::document::Page;
use crate::pdf::transform::copy_unmodified;
use qpdf::{EncryptionParams, EncryptionParamsR6, ObjectStreamMode, PrintPermission, QPdf};

/// Builds an output PDF from a sequence of pages
pub struct PdfWriter {
    dest: QPdf,
    /// Source handles stay alive until the output is written
    sources: Vec<QPdf>,
    page_count: u32,
    compress: bool,
    password: Option<String>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    /// Start an empty output document
    pub fn new() -> Self {
        Self {
            dest: QPdf::empty(),
            sources: Vec::new(),
            page_count: 0,
            compress: false,
            password: None,
        }
    }

    /// Serialize `pages` in order, optionally encrypted with `password`
    pub fn write_pages(pages: &[Page], password: Option<&str>) -> Result<Vec<u8>> {
        let mut writer = Self::new();
        if let Some(password) = password {
            writer.encrypt(password)?;
        }
        for page in pages {
            writer.add_page(page)?;
        }
        writer.write()
    }

    /// Recompress content streams and pack objects into object streams on
    /// write. Otherwise qpdf's default stream handling applies.
    ///
    /// Stream-level only: images are not re-encoded.
    pub fn compress_content_streams(&mut self, compress: bool) -> &mut Self {
        self.compress = compress;
        self
    }

    /// Encrypt the output with `password` as both user and owner password
    pub fn encrypt(&mut self, password: &str) -> Result<&mut Self> {
        if password.is_empty() {
            return Err(Error::missing("password"));
        }
        self.password = Some(password.to_string());
        Ok(self)
    }

    /// Append a copy of `page` and return the copy for further transforms
    pub fn add_page(&mut self, page: &Page) -> Result<Page> {
        let copied = copy_unmodified(page, &self.dest);
        self.dest
            .add_page(copied.dictionary(), false)
            .map_err(map_qpdf_error)?;
        self.sources.push(page.owner().clone());
        self.page_count += 1;
        Ok(copied)
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Serialize the output document
    pub fn write(self) -> Result<Vec<u8>> {
        let mut writer = self.dest.writer();
        writer.preserve_encryption(false);

        if self.compress {
            writer
                .object_stream_mode(ObjectStreamMode::Generate)
                .compress_streams(true)
                .normalize_content(true)
                .preserve_unreferenced_objects(false);
        }

        if let Some(password) = &self.password {
            writer.encryption_params(EncryptionParams::R6(EncryptionParamsR6 {
                user_password: password.clone(),
                owner_password: password.clone(),
                allow_accessibility: true,
                allow_extract: true,
                allow_assemble: true,
                allow_annotate_and_form: true,
                allow_form_filling: true,
                allow_modify_other: true,
                allow_print: PrintPermission::Full,
                encrypt_metadata: true,
            }));
        }

        let output = writer.write_to_memory().map_err(map_qpdf_error)?;
        drop(self.sources);
        Ok(output)
    }
}
