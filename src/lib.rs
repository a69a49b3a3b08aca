//! PDF Ops Server Library
//!
//! This crate provides stateless HTTP endpoints for PDF operations:
//! - `pdf-to-word`: Convert a PDF to DOCX through an external renderer
//! - `compress-pdf`: Recompress content streams
//! - `merge-pdf` / `split-pdf`: Combine documents or break them into pages
//! - `encrypt-pdf` / `decrypt-pdf`: Add or remove password protection
//! - `rotate-pdf`: Rotate every page by a multiple of 90 degrees
//! - `extract-images`: Pull embedded image XObjects into a zip archive

pub mod archive;
pub mod artifact;
pub mod config;
pub mod convert;
pub mod error;
pub mod pdf;
pub mod server;
pub mod upload;

pub use artifact::{Download, OutputArtifact};
pub use config::ServerConfig;
pub use convert::{CommandConverter, DocumentConverter};
pub use error::{Error, Result};
pub use server::{router, run_server, AppState};
