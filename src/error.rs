//! Error types for the extraction library.
//!
//! This module defines all error types that can occur while talking to the
//! conversion, detection, recognition and storage collaborators, and while
//! reading TEI documents.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during paper processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TEI / XML input
    #[error("XML error: {0}")]
    Xml(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote service answered with a non-success status
    #[error("{service} returned HTTP {status}: {body}")]
    ServiceStatus {
        /// Name of the remote service
        service: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body (possibly truncated)
        body: String,
    },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding / encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// External command (renderer, recognizer) failed
    #[error("{program} failed: {message}")]
    Command {
        /// Program that was invoked
        program: &'static str,
        /// Failure description
        message: String,
    },

    /// Persistence store rejected an operation
    #[error("Store error: {0}")]
    Store(String),

    /// A pipeline run finished without success
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Caller supplied input that cannot be processed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required configuration value is missing
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
