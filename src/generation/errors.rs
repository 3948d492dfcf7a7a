//! Error types for the generation domain

use thiserror::Error;

/// Errors that abort a generation run
///
/// Recoverable schema problems are not errors; they are collected as
/// [`Diagnostic`](crate::generation::Diagnostic)s instead.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("OpenAPI loading error: {0}")]
    LoadError(String),

    #[error("Invalid status code {code:?} in operation {operation}")]
    InvalidStatusCode { operation: String, code: String },

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Post-processing error: {0}")]
    PostProcessingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
