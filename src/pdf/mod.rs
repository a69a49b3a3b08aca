//! PDF processing layer
//!
//! This module provides the page model, page transforms and document
//! serialization on top of qpdf.

mod document;
mod operations;
mod transform;
mod writer;

pub use document::{Document, Page, ResourceEntry};
pub use operations::PdfOperations;
pub use transform::{
    copy_unmodified, extract_images, parse_angle, rotate, validate_angle, EmbeddedImage,
    ImageEncoding,
};
pub use writer::PdfWriter;
