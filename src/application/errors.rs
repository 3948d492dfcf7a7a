//! Application layer error types

use thiserror::Error;

/// Application layer errors
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Generation error: {0}")]
    GenerationError(#[from] crate::generation::GenerationError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Validation errors for requests
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Package name cannot be empty")]
    EmptyPackageName,

    #[error("Invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("Invalid client name: {0}")]
    InvalidClientName(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}
