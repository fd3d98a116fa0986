// src/tokenizer/result.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Training text or configuration that cannot produce a model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model file to load does not exist.
    #[error("Model not found at {}", .0.display())]
    ModelNotFound(PathBuf),

    /// The document parsed but does not have the shape of a model or metrics file.
    #[error("Malformed model: {0}")]
    MalformedModel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedModel(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
