//! Error types for the TTS backend

use thiserror::Error;

/// Audio-specific errors
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("Codec error: {0}")]
    Codec(String),
}

/// Errors raised by the model collaborator and its loader
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Device unavailable: {0}")]
    Device(String),

    #[error("Failed to load model: {0}")]
    Load(String),

    #[error("Failed to download {file} from {repo}: {message}")]
    Download {
        repo: String,
        file: String,
        message: String,
    },

    #[error("Checkpoint rejected for submodule '{submodule}': {message}")]
    Checkpoint { submodule: String, message: String },

    #[error("Synthesis failed: {0}")]
    Generation(String),
}

impl ModelError {
    pub fn checkpoint(submodule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Checkpoint {
            submodule: submodule.into(),
            message: message.into(),
        }
    }
}
