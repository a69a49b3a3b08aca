//! Multipart form collection

use crate::artifact;
use crate::error::{Error, Result};
use crate::upload::ScratchSpace;
use axum::extract::Multipart;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// An uploaded file saved to scratch storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Form field the file arrived in
    pub field: String,
    /// Filename as sent by the client
    pub file_name: String,
    pub path: PathBuf,
}

impl StoredFile {
    /// Sanitized stem used to name outputs
    pub fn stem(&self) -> String {
        artifact::file_stem(&self.file_name)
    }

    pub async fn read(&self) -> Result<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }
}

/// Files and text fields of one multipart request
#[derive(Debug, Default)]
pub struct UploadForm {
    files: Vec<StoredFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    /// Drain the multipart body, storing file parts in `scratch`.
    ///
    /// File parts with an empty filename (an empty file input) are skipped.
    /// For repeated text fields the first value wins.
    pub async fn collect(multipart: &mut Multipart, scratch: &mut ScratchSpace) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) if file_name.is_empty() => {
                    debug!(field = %name, "Skipping empty file input");
                }
                Some(file_name) => {
                    let data = field.bytes().await?;
                    let path = scratch.store(&data).await?;
                    debug!(field = %name, size = data.len(), "Stored upload");
                    form.files.push(StoredFile {
                        field: name,
                        file_name,
                        path,
                    });
                }
                None => {
                    let value = field.text().await?;
                    form.fields.entry(name).or_insert(value);
                }
            }
        }

        Ok(form)
    }

    /// All files sent under `field`, in upload order
    pub fn files(&self, field: &str) -> Vec<&StoredFile> {
        self.files.iter().filter(|f| f.field == field).collect()
    }

    /// First file sent under `field`
    pub fn file(&self, field: &str) -> Option<&StoredFile> {
        self.files.iter().find(|f| f.field == field)
    }

    pub fn require_file(&self, field: &str) -> Result<&StoredFile> {
        self.file(field).ok_or_else(|| Error::missing(field))
    }

    /// Text field value; an empty value counts as absent
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn require_text(&self, field: &str) -> Result<&str> {
        self.text(field).ok_or_else(|| Error::missing(field))
    }
}
