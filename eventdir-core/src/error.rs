//! Error types for eventdir.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, storing or exporting events.
///
/// Filtering, query encoding and dispatch never fail and have no error type.
#[derive(Error, Debug)]
pub enum EventDirError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for eventdir operations.
pub type EventDirResult<T> = Result<T, EventDirError>;
