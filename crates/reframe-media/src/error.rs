//! Error types for frame analysis.

use reframe_models::GeometryError;
use thiserror::Error;

/// Result type for analysis operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during frame analysis.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid frame geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid luma frame: {0}")]
    InvalidFrame(String),

    #[error("Frame {got} received after frame {last}; frames must arrive in increasing order")]
    FrameOrder { last: u64, got: u64 },
}

impl MediaError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Create an invalid luma frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame(message.into())
    }

    /// Whether the error comes from run configuration rather than frame data.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidGeometry(_) | Self::InvalidConfig(_))
    }
}
