//! Stub model (returns silence)

use std::path::Path;

use aksa_tts_core::{ModelError, SpeechModel, Waveform};

/// Stand-in used when the neural runtime is not part of the build
pub struct StubModel {
    sample_rate: u32,
}

impl StubModel {
    pub fn new(sample_rate: u32) -> Self {
        tracing::warn!("Using stub TTS backend - audio output will be silence");
        Self { sample_rate }
    }

    /// ~50ms of silence per character
    fn duration_samples(&self, text: &str) -> usize {
        text.chars().count() * (self.sample_rate as usize / 20)
    }
}

#[async_trait::async_trait]
impl SpeechModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn generate(&self, text: &str, _reference_audio: &Path) -> Result<Waveform, ModelError> {
        Ok(Waveform::silence(self.duration_samples(text), self.sample_rate))
    }
}
