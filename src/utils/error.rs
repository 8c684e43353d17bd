// src/utils/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Change log entry for version '{0}' not found.")]
    SectionNotFound(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
