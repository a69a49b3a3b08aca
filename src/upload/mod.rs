//! Request-scoped upload handling

pub mod form;
pub mod scratch;

pub use form::{StoredFile, UploadForm};
pub use scratch::ScratchSpace;
