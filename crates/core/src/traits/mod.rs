//! Model seams
//!
//! The neural model is an external collaborator. Everything the backend
//! needs from it goes through these two traits.

use std::path::Path;

use crate::{ModelError, Waveform};

/// A voice-cloning speech model
#[async_trait::async_trait]
pub trait SpeechModel: Send + Sync {
    /// Short backend name for logs and readiness reports
    fn name(&self) -> &str;

    /// Native output sample rate
    fn sample_rate(&self) -> u32;

    /// Synthesize `text` in the voice of the reference recording
    ///
    /// Blocks until the whole utterance is generated; there is no partial
    /// output and no cancellation.
    async fn generate(&self, text: &str, reference_audio: &Path) -> Result<Waveform, ModelError>;
}

/// Lifecycle hooks used by the model loader before the model is shared
pub trait PretrainedModel: SpeechModel {
    /// Replace the weights of `submodule` with the tensors stored in
    /// `checkpoint`. Returns the number of tensors applied.
    fn load_submodule_weights(
        &mut self,
        submodule: &str,
        checkpoint: &Path,
    ) -> Result<usize, ModelError>;

    /// Release cached device memory left over from loading
    fn release_device_cache(&self) {}
}
