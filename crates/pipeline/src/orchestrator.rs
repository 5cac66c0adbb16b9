//! Request pipeline: readiness → accent resolution → synthesis → encoding
//!
//! The whole utterance is generated and encoded before anything is handed
//! to delivery, so a failing request never produces a truncated file.

use std::path::Path;
use std::sync::Arc;

use aksa_tts_core::{SpeechModel, TtsRequest};

use crate::accent::AccentResolver;
use crate::encoder::{encode_wav, EncodedAudio};
use crate::model::ModelHandle;
use crate::synthesis::SpeechSynthesizer;
use crate::PipelineError;

pub struct SpeechPipeline {
    resolver: AccentResolver,
    synthesizer: SpeechSynthesizer,
}

impl SpeechPipeline {
    pub fn new(resolver: AccentResolver, model: Arc<ModelHandle>, max_concurrent: usize) -> Self {
        Self {
            resolver,
            synthesizer: SpeechSynthesizer::new(model, max_concurrent),
        }
    }

    pub fn resolver(&self) -> &AccentResolver {
        &self.resolver
    }

    pub fn synthesizer(&self) -> &SpeechSynthesizer {
        &self.synthesizer
    }

    /// Render a request to WAV bytes
    ///
    /// Errors are checked in order: model readiness (server fault), then
    /// the reference file (client fault), then synthesis and encoding.
    pub async fn render(&self, request: &TtsRequest) -> Result<EncodedAudio, PipelineError> {
        let model = self.synthesizer.ready_model()?;

        tracing::info!(accent_id = %request.accent_id, "Received streaming request");

        let reference = self.resolver.resolve(&request.accent_id)?;
        self.generate_wav(model.as_ref(), &request.text, &reference)
            .await
    }

    /// Render `text` against an explicit reference recording
    pub async fn render_with_reference(
        &self,
        text: &str,
        reference: &Path,
    ) -> Result<EncodedAudio, PipelineError> {
        let model = self.synthesizer.ready_model()?;
        self.generate_wav(model.as_ref(), text, reference).await
    }

    async fn generate_wav(
        &self,
        model: &dyn SpeechModel,
        text: &str,
        reference: &Path,
    ) -> Result<EncodedAudio, PipelineError> {
        let waveform = self
            .synthesizer
            .synthesize(model, text, reference)
            .await?;

        tracing::info!("Synthesis complete, converting to WAV in memory...");
        let audio = encode_wav(&waveform)?;

        tracing::debug!(
            bytes = audio.len(),
            sample_rate = audio.sample_rate(),
            "WAV buffer ready"
        );

        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accent::AccentLibrary;
    use crate::model::StubModel;
    use tempfile::TempDir;

    fn reference_dir(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            std::fs::write(dir.path().join(file), b"RIFF").unwrap();
        }
        dir
    }

    fn pipeline(dir: &TempDir, handle: ModelHandle) -> SpeechPipeline {
        SpeechPipeline::new(
            AccentResolver::new(AccentLibrary::builtin(), dir.path()),
            Arc::new(handle),
            1,
        )
    }

    #[tokio::test]
    async fn test_render_known_accent() {
        let dir = reference_dir(&["aksen_jawa_pria.wav"]);
        let pipeline = pipeline(&dir, ModelHandle::ready(Arc::new(StubModel::new(24000))));

        let audio = pipeline
            .render(&TtsRequest::new("Halo dunia", "jawa"))
            .await
            .unwrap();

        assert_eq!(&audio.bytes()[..4], b"RIFF");
        assert_eq!(audio.sample_rate(), 24000);
        assert_eq!(audio.num_samples(), 10 * 1200);
    }

    #[tokio::test]
    async fn test_unready_model_checked_before_accent() {
        let dir = reference_dir(&[]);
        let pipeline = pipeline(&dir, ModelHandle::failed("checkpoint missing"));

        let result = pipeline.render(&TtsRequest::new("Halo", "jawa")).await;
        assert!(matches!(result, Err(PipelineError::ModelUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_reference_is_client_fault() {
        let dir = reference_dir(&["aksen_default_pria.wav"]);
        let pipeline = pipeline(&dir, ModelHandle::ready(Arc::new(StubModel::new(24000))));

        let err = pipeline
            .render(&TtsRequest::new("Halo", "Bali"))
            .await
            .unwrap_err();

        assert!(err.is_client_fault());
        assert!(err.to_string().contains("'Bali'"));
    }

    #[tokio::test]
    async fn test_unknown_accent_uses_default_reference() {
        let dir = reference_dir(&["aksen_default_pria.wav"]);
        let pipeline = pipeline(&dir, ModelHandle::ready(Arc::new(StubModel::new(16000))));

        let audio = pipeline
            .render(&TtsRequest::new("Halo", "unknown_xyz"))
            .await
            .unwrap();

        assert_eq!(audio.sample_rate(), 16000);
    }
}
