//! Output artifacts and their deterministic names
//!
//! Every output name is built from the upload's sanitized stem plus a suffix
//! unique to the operation, so two operations on the same input never
//! produce the same name.

use crate::archive::{self, ArchiveEntry};
use crate::error::Result;
use unicode_normalization::UnicodeNormalization;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const ZIP_MEDIA_TYPE: &str = "application/zip";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Name of the merge output, which has no single source stem
pub const MERGED_OUTPUT_NAME: &str = "merged_output.pdf";

pub fn converted_docx(stem: &str) -> String {
    format!("{stem}_converted.docx")
}

pub fn compressed_pdf(stem: &str) -> String {
    format!("{stem}_compressed.pdf")
}

pub fn split_archive(stem: &str) -> String {
    format!("{stem}_split_pages.zip")
}

/// Entry name for a split page, `page` is 1-indexed
pub fn split_page(stem: &str, page: usize) -> String {
    format!("{stem}_page_{page}.pdf")
}

pub fn encrypted_pdf(stem: &str) -> String {
    format!("{stem}_encrypted.pdf")
}

pub fn decrypted_pdf(stem: &str) -> String {
    format!("{stem}_decrypted.pdf")
}

pub fn rotated_pdf(stem: &str) -> String {
    format!("{stem}_rotated.pdf")
}

pub fn images_archive(stem: &str) -> String {
    format!("{stem}_images.zip")
}

/// Entry name for an extracted image, `index` is 1-indexed across the document
pub fn image_entry(stem: &str, index: usize, extension: &str) -> String {
    format!("{stem}_img_{index}.{extension}")
}

/// Reduce a client-supplied filename to a safe ASCII name.
///
/// Accented letters are folded to their ASCII base through NFKD, directory
/// components are dropped, whitespace becomes `_`, and only ASCII
/// alphanumerics plus `.`, `-` and `_` survive.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .nfkd()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitized filename without its final extension
pub fn file_stem(name: &str) -> String {
    let sanitized = sanitize_filename(name);
    match sanitized.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => sanitized,
    }
}

/// Result of one operation
#[derive(Debug)]
pub enum OutputArtifact {
    File {
        name: String,
        media_type: &'static str,
        data: Vec<u8>,
    },
    Archive {
        name: String,
        entries: Vec<ArchiveEntry>,
    },
}

impl OutputArtifact {
    pub fn pdf(name: String, data: Vec<u8>) -> Self {
        OutputArtifact::File {
            name,
            media_type: PDF_MEDIA_TYPE,
            data,
        }
    }

    /// Produce the response payload, packing archives
    pub fn finish(self) -> Result<Download> {
        match self {
            OutputArtifact::File {
                name,
                media_type,
                data,
            } => Ok(Download {
                file_name: name,
                content_type: media_type,
                data,
            }),
            OutputArtifact::Archive { name, entries } => Ok(Download {
                file_name: name,
                content_type: ZIP_MEDIA_TYPE,
                data: archive::pack(&entries)?,
            }),
        }
    }
}

/// Bytes ready to be sent as an attachment
#[derive(Debug)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}
