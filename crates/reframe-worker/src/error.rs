//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Malformed input {}: {message}", path.display())]
    MalformedInput { path: PathBuf, message: String },

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] reframe_models::GeometryError),

    #[error("Media error: {0}")]
    Media(#[from] reframe_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl WorkerError {
    pub fn malformed(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    /// Check if the error stems from bad run parameters rather than I/O.
    ///
    /// These fail before any frame is written and retrying won't help.
    pub fn is_config_error(&self) -> bool {
        match self {
            WorkerError::InvalidVideoId(_) | WorkerError::Geometry(_) => true,
            WorkerError::Media(e) => e.is_config_error(),
            _ => false,
        }
    }
}
