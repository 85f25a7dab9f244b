use thiserror::Error;

use crate::services::storage::StorageError;

#[derive(Error, Debug)]
pub enum NoteSplitterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Destination folder error for '{path}': {reason}")]
    Destination { path: String, reason: String },

    #[error("Settings error: {reason}")]
    Settings { reason: String },
}

pub type Result<T> = std::result::Result<T, NoteSplitterError>;
