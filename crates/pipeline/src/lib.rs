//! Speech pipeline for the TTS backend
//!
//! This crate provides the request path behind the HTTP surface:
//! - Accent resolution to a reference recording on disk
//! - Model loading, readiness tracking and the model backends
//! - Bounded synthesis against the shared model
//! - 16-bit mono WAV encoding
//! - Delivery as a file or as a chunked byte stream

pub mod accent;
pub mod delivery;
pub mod encoder;
pub mod model;
pub mod orchestrator;
pub mod synthesis;

pub use accent::{AccentLibrary, AccentResolver, DEFAULT_ACCENT};
pub use delivery::{chunk_stream, write_to_dir};
pub use encoder::{encode_wav, EncodedAudio};
pub use model::{ModelHandle, ModelLoader, ModelState, StubModel};
pub use orchestrator::SpeechPipeline;
pub use synthesis::SpeechSynthesizer;

use std::path::PathBuf;

use aksa_tts_core::{AudioError, ModelError};
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Reference audio for accent '{accent_id}' not found at {}", path.display())]
    AccentNotFound { accent_id: String, path: PathBuf },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Synthesis queue closed")]
    ChannelClosed,
}

impl PipelineError {
    /// True when the request itself is at fault (404-class)
    pub fn is_client_fault(&self) -> bool {
        matches!(self, PipelineError::AccentNotFound { .. })
    }
}
