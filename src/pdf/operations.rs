//! Whole-document operations
//!
//! Each operation reads its input with [`Document`], rebuilds a fresh output
//! with [`PdfWriter`] and names the result from the upload's stem. All of
//! them are synchronous and CPU bound; callers run them off the async
//! runtime.

use crate::archive::ArchiveEntry;
use crate::artifact::{self, OutputArtifact};
use crate::error::{Error, Result};
use crate::pdf::document::Document;
use crate::pdf::transform;
use crate::pdf::writer::PdfWriter;
use tracing::{debug, info};

/// Stateless PDF operations
pub struct PdfOperations;

impl PdfOperations {
    /// Rewrite every page with content streams recompressed
    pub fn compress(input: &[u8], stem: &str) -> Result<OutputArtifact> {
        let document = Document::read(input)?;

        let mut writer = PdfWriter::new();
        writer.compress_content_streams(true);
        for page in document.pages()? {
            writer.add_page(&page)?;
        }
        let output = writer.write()?;

        info!(
            input_bytes = input.len(),
            output_bytes = output.len(),
            "Compressed PDF"
        );
        Ok(OutputArtifact::pdf(artifact::compressed_pdf(stem), output))
    }

    /// Concatenate documents in upload order, then page order within each
    pub fn merge(inputs: &[&[u8]]) -> Result<OutputArtifact> {
        if inputs.is_empty() {
            return Err(Error::missing("merge_pdf"));
        }

        let documents = inputs
            .iter()
            .map(|data| Document::read(*data))
            .collect::<Result<Vec<_>>>()?;

        let mut writer = PdfWriter::new();
        for (i, document) in documents.iter().enumerate() {
            let pages = document.pages()?;
            debug!(input = i, pages = pages.len(), "Appending input PDF");
            for page in &pages {
                writer.add_page(page)?;
            }
        }

        let page_count = writer.page_count();
        let output = writer.write()?;

        info!(
            inputs = inputs.len(),
            pages = page_count,
            output_bytes = output.len(),
            "Merged PDFs"
        );
        Ok(OutputArtifact::pdf(
            artifact::MERGED_OUTPUT_NAME.to_string(),
            output,
        ))
    }

    /// One single-page PDF per page, packaged as an archive
    pub fn split(input: &[u8], stem: &str) -> Result<OutputArtifact> {
        let document = Document::read(input)?;
        let pages = document.pages()?;

        let entries = pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let data = PdfWriter::write_pages(std::slice::from_ref(page), None)?;
                Ok(ArchiveEntry::new(artifact::split_page(stem, i + 1), data))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(pages = entries.len(), "Split PDF");
        Ok(OutputArtifact::Archive {
            name: artifact::split_archive(stem),
            entries,
        })
    }

    /// Rewrite the document encrypted with `password`
    pub fn encrypt(input: &[u8], stem: &str, password: &str) -> Result<OutputArtifact> {
        if password.is_empty() {
            return Err(Error::missing("password"));
        }

        let document = Document::read(input)?;
        let output = PdfWriter::write_pages(&document.pages()?, Some(password))?;

        info!(output_bytes = output.len(), "Encrypted PDF");
        Ok(OutputArtifact::pdf(artifact::encrypted_pdf(stem), output))
    }

    /// Unlock the document with `password` and rewrite it without encryption
    pub fn decrypt(input: &[u8], stem: &str, password: &str) -> Result<OutputArtifact> {
        if password.is_empty() {
            return Err(Error::missing("password"));
        }

        let mut document = Document::read(input)?;
        if !document.is_encrypted() {
            return Err(Error::NotEncrypted);
        }
        if !document.try_decrypt(password)? {
            return Err(Error::WrongPassword);
        }

        let output = PdfWriter::write_pages(&document.pages()?, None)?;

        info!(output_bytes = output.len(), "Decrypted PDF");
        Ok(OutputArtifact::pdf(artifact::decrypted_pdf(stem), output))
    }

    /// Rotate every page by `angle` degrees
    pub fn rotate(input: &[u8], stem: &str, angle: i64) -> Result<OutputArtifact> {
        transform::validate_angle(angle)?;
        let document = Document::read(input)?;

        let mut writer = PdfWriter::new();
        for page in document.pages()? {
            let copied = writer.add_page(&page)?;
            transform::rotate(&copied, angle)?;
        }
        let page_count = writer.page_count();
        let output = writer.write()?;

        info!(angle, pages = page_count, "Rotated PDF");
        Ok(OutputArtifact::pdf(artifact::rotated_pdf(stem), output))
    }

    /// Collect every image XObject across all pages into an archive
    pub fn extract_images(input: &[u8], stem: &str) -> Result<OutputArtifact> {
        let document = Document::read(input)?;

        let mut entries = Vec::new();
        for (page_index, page) in document.pages()?.iter().enumerate() {
            for image in transform::extract_images(page) {
                let image = image?;
                let name =
                    artifact::image_entry(stem, entries.len() + 1, image.encoding.extension());
                debug!(
                    page = page_index + 1,
                    resource = %image.name,
                    entry = %name,
                    "Extracted image"
                );
                entries.push(ArchiveEntry::new(name, image.into_file_bytes()?));
            }
        }

        if entries.is_empty() {
            return Err(Error::NotFound {
                what: "images".to_string(),
            });
        }

        info!(images = entries.len(), "Extracted images");
        Ok(OutputArtifact::Archive {
            name: artifact::images_archive(stem),
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_requires_input() {
        assert!(matches!(
            PdfOperations::merge(&[]),
            Err(Error::MissingInput { .. })
        ));
    }

    #[test]
    fn test_encrypt_requires_password() {
        assert!(matches!(
            PdfOperations::encrypt(b"%PDF-1.4", "doc", ""),
            Err(Error::MissingInput { .. })
        ));
    }

    #[test]
    fn test_operations_reject_non_pdf() {
        assert!(matches!(
            PdfOperations::compress(b"not a pdf", "doc"),
            Err(Error::Parse { .. })
        ));
        assert!(matches!(
            PdfOperations::split(b"not a pdf", "doc"),
            Err(Error::Parse { .. })
        ));
    }
}
