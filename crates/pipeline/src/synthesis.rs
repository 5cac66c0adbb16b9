//! Synthesis invoker
//!
//! Calls the shared model with a bounded number of in-flight requests.
//! Requests beyond the bound wait for a permit; nothing is rejected and
//! nothing times out.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use aksa_tts_core::{SpeechModel, Waveform};
use tokio::sync::Semaphore;

use crate::model::ModelHandle;
use crate::PipelineError;

pub struct SpeechSynthesizer {
    model: Arc<ModelHandle>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
}

impl SpeechSynthesizer {
    pub fn new(model: Arc<ModelHandle>, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            model,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
        }
    }

    /// The shared model if it finished loading
    pub fn ready_model(&self) -> Result<Arc<dyn SpeechModel>, PipelineError> {
        self.model.model()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Free synthesis slots right now
    pub fn available_slots(&self) -> usize {
        self.permits.available_permits()
    }

    /// Generate speech for `text` in the voice of `reference_audio`
    pub async fn synthesize(
        &self,
        model: &dyn SpeechModel,
        text: &str,
        reference_audio: &Path,
    ) -> Result<Waveform, PipelineError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| PipelineError::ChannelClosed)?;

        tracing::info!(
            model = model.name(),
            reference = %reference_audio.display(),
            chars = text.chars().count(),
            "Starting synthesis (generate)..."
        );

        let start = Instant::now();
        let waveform = model.generate(text, reference_audio).await?;

        tracing::info!(
            samples = waveform.len(),
            audio_secs = waveform.duration_secs(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Synthesis finished"
        );

        Ok(waveform)
    }
}
