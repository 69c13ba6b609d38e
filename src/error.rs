//! Error types for document generation.

use thiserror::Error;

/// Everything that can abort a document generation call.
///
/// Missing or undecodable images are *not* errors: they are resolved to
/// "absent" during asset preparation and rendered as placeholders.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Font error: {0}")]
    Font(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Invalid record: {0}")]
    Record(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DocumentError>;
