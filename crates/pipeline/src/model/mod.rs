//! Model lifecycle
//!
//! The model is loaded once per process and shared by every request.
//! `ModelHandle` is written exactly once by the loader, so readers see
//! either no model yet, a fully loaded model, or the load failure.
//! A failed load is terminal for the process lifetime.

mod device;
mod hub;
mod stub;

#[cfg(feature = "candle")]
pub mod chatterbox;

pub use device::{accelerator_available, resolve_device};
pub use hub::fetch_artifact;
pub use stub::StubModel;

#[cfg(feature = "candle")]
pub use chatterbox::ChatterboxModel;

use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use aksa_tts_config::{ModelConfig, TtsEngine};
use aksa_tts_core::{ComputeDevice, ModelError, PretrainedModel, SpeechModel};

use crate::PipelineError;

/// Observable model state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Loading,
    Ready { name: String, sample_rate: u32 },
    Failed(String),
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelState::Loading => "loading",
            ModelState::Ready { .. } => "ready",
            ModelState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelState::Loading => write!(f, "loading"),
            ModelState::Ready { name, sample_rate } => {
                write!(f, "ready ({} @ {} Hz)", name, sample_rate)
            }
            ModelState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

type LoadOutcome = Result<Arc<dyn SpeechModel>, String>;

/// Process-wide, write-once slot for the shared model
#[derive(Default)]
pub struct ModelHandle {
    slot: OnceLock<LoadOutcome>,
}

impl ModelHandle {
    /// Empty handle in the `Loading` state
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(model: Arc<dyn SpeechModel>) -> Self {
        let handle = Self::new();
        handle.set(Ok(model));
        handle
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        let handle = Self::new();
        handle.set(Err(reason.into()));
        handle
    }

    /// Record the load outcome. Only the first call has any effect.
    pub fn set(&self, outcome: Result<Arc<dyn SpeechModel>, String>) -> bool {
        let stored = self.slot.set(outcome).is_ok();
        if !stored {
            tracing::warn!("Model handle already initialized, ignoring second load outcome");
        }
        stored
    }

    pub fn state(&self) -> ModelState {
        match self.slot.get() {
            None => ModelState::Loading,
            Some(Ok(model)) => ModelState::Ready {
                name: model.name().to_string(),
                sample_rate: model.sample_rate(),
            },
            Some(Err(reason)) => ModelState::Failed(reason.clone()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.slot.get(), Some(Ok(_)))
    }

    /// The shared model, or `ModelUnavailable` while loading or after a failure
    pub fn model(&self) -> Result<Arc<dyn SpeechModel>, PipelineError> {
        match self.slot.get() {
            Some(Ok(model)) => Ok(Arc::clone(model)),
            Some(Err(reason)) => Err(PipelineError::ModelUnavailable(reason.clone())),
            None => Err(PipelineError::ModelUnavailable(
                "model is still loading".to_string(),
            )),
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// Builds the configured model: device → base model → checkpoint override
/// → device cache release
#[derive(Debug, Clone)]
pub struct ModelLoader {
    config: ModelConfig,
}

impl ModelLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Load the model synchronously. Downloads and weight loading block.
    pub fn load(&self) -> Result<Arc<dyn SpeechModel>, PipelineError> {
        let device = resolve_device(self.config.device);

        tracing::info!("=========================================");
        tracing::info!("USING DEVICE: {}", device);
        tracing::info!("=========================================");
        tracing::info!(engine = %self.config.engine, "Loading TTS model (cold start)...");

        let model = match self.config.engine {
            TtsEngine::Stub => {
                let model = StubModel::new(self.config.stub_sample_rate);
                tracing::info!("Stub engine selected, skipping checkpoint download");
                Arc::new(model) as Arc<dyn SpeechModel>
            }
            TtsEngine::Chatterbox => self.load_chatterbox(device)?,
        };

        tracing::info!("=========================================");
        tracing::info!("MODEL READY (WARM). Server is accepting requests.");
        tracing::info!("=========================================");

        Ok(model)
    }

    /// Download the configured checkpoint and apply it to `model`
    pub fn apply_checkpoint<M>(&self, model: &mut M) -> Result<usize, PipelineError>
    where
        M: PretrainedModel + ?Sized,
    {
        let checkpoint = fetch_artifact(&self.config.checkpoint_repo, &self.config.checkpoint_file)?;
        self.apply_checkpoint_from(model, &checkpoint)
    }

    /// Apply an already-downloaded checkpoint to `model`
    pub fn apply_checkpoint_from<M>(
        &self,
        model: &mut M,
        checkpoint: &Path,
    ) -> Result<usize, PipelineError>
    where
        M: PretrainedModel + ?Sized,
    {
        let submodule = &self.config.checkpoint_submodule;
        let applied = model.load_submodule_weights(submodule, checkpoint)?;
        model.release_device_cache();

        tracing::info!(
            submodule = %submodule,
            tensors = applied,
            checkpoint = %checkpoint.display(),
            "Checkpoint applied"
        );

        Ok(applied)
    }

    #[cfg(feature = "candle")]
    fn load_chatterbox(&self, device: ComputeDevice) -> Result<Arc<dyn SpeechModel>, PipelineError> {
        let mut model = ChatterboxModel::from_pretrained(&self.config.base_repo, device)?;
        self.apply_checkpoint(&mut model)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "candle"))]
    fn load_chatterbox(&self, _device: ComputeDevice) -> Result<Arc<dyn SpeechModel>, PipelineError> {
        Err(ModelError::Load(
            "the chatterbox engine requires building with the `candle` feature".to_string(),
        )
        .into())
    }

    /// Load on the blocking pool and publish the outcome into `handle`
    ///
    /// Failures, panics included, are logged once and leave the handle
    /// permanently failed.
    pub fn spawn(self, handle: Arc<ModelHandle>) -> tokio::task::JoinHandle<()> {
        publish_load(move || self.load(), handle)
    }
}

fn publish_load<F>(load: F, handle: Arc<ModelHandle>) -> tokio::task::JoinHandle<()>
where
    F: FnOnce() -> Result<Arc<dyn SpeechModel>, PipelineError> + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match tokio::task::spawn_blocking(load).await {
            Ok(Ok(model)) => Ok(model),
            Ok(Err(e)) => {
                tracing::error!("FATAL ERROR: failed to load model. {}", e);
                Err(e.to_string())
            }
            Err(e) => {
                tracing::error!("FATAL ERROR: model loader panicked. {}", e);
                Err(format!("model loader panicked: {}", e))
            }
        };
        handle.set(outcome);
    })
}
