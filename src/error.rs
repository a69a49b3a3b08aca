//! Error types for PDF Ops Server

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for PDF Ops Server
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for PDF Ops Server
#[derive(Error, Debug)]
pub enum Error {
    /// Required file or form field is absent
    #[error("Missing required input: {field}")]
    MissingInput { field: String },

    /// Malformed parameter value (e.g. rotation angle)
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    /// Unreadable PDF byte stream
    #[error("Invalid PDF file: {reason}")]
    Parse { reason: String },

    /// PDF is password protected and has not been unlocked
    #[error("PDF is password protected")]
    PasswordRequired,

    /// Decrypt requested for a document that is not encrypted
    #[error("PDF is not encrypted")]
    NotEncrypted,

    /// Candidate password did not unlock the document
    #[error("Incorrect password")]
    WrongPassword,

    /// External PDF-to-Word renderer failed
    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    /// Nothing extractable was found
    #[error("No {what} found")]
    NotFound { what: String },

    /// qpdf serialization error
    #[error("qpdf error: {reason}")]
    Qpdf { reason: String },

    /// Multipart body could not be read
    #[error("Malformed upload: {0}")]
    Upload(#[from] axum::extract::multipart::MultipartError),

    /// Zip archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Worker task failed or the job queue is gone
    #[error("Internal error: {reason}")]
    Internal { reason: String },

    /// Job exceeded the configured time budget
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Invalid configuration value
    #[error("Invalid configuration for {key}: {value:?}")]
    Config { key: String, value: String },
}

impl Error {
    /// Shorthand for [`Error::MissingInput`].
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingInput {
            field: field.into(),
        }
    }

    /// HTTP status used when this error reaches a request handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingInput { .. }
            | Error::InvalidParameter { .. }
            | Error::Upload(_)
            | Error::PasswordRequired
            | Error::NotEncrypted => StatusCode::BAD_REQUEST,
            Error::WrongPassword => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Timeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Parse { .. }
            | Error::Qpdf { .. }
            | Error::Conversion { .. }
            | Error::Archive(_)
            | Error::Image(_)
            | Error::Io(_)
            | Error::Internal { .. }
            | Error::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Return a message safe to send to clients.
    /// Library and filesystem details are omitted for internal failures;
    /// parser and renderer messages are passed through.
    /// Full details should be logged via tracing before calling this.
    pub fn client_message(&self) -> String {
        match self {
            Error::Archive(_) => "Failed to build archive".to_string(),
            Error::Image(_) => "Failed to encode image".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Config { .. } => "Server misconfigured".to_string(),
            other => other.to_string(),
        }
    }
}

/// Map qpdf crate errors to our error types
pub(crate) fn map_qpdf_error(e: qpdf::QPdfError) -> Error {
    match e.error_code() {
        qpdf::QPdfErrorCode::InvalidPassword => Error::WrongPassword,
        _ => Error::Qpdf {
            reason: e.to_string(),
        },
    }
}
