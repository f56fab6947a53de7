//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("value at path '{path}' is not an array")]
    NotAnArray { path: String },

    #[error("snapshot '{binding}' entry {index} has neither object nor filter result")]
    EmptySnapshotEntry { binding: String, index: usize },

    #[error("invalid hook config: {message}")]
    InvalidHookConfig { message: String },

    #[error("invalid binding context: {message}")]
    InvalidBindingContext { message: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
