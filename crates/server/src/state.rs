//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use aksa_tts_config::Settings;
use aksa_tts_pipeline::{AccentLibrary, AccentResolver, ModelHandle, SpeechPipeline};

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Write-once model slot, filled by the loader
    pub model: Arc<ModelHandle>,
    /// Resolve → synthesize → encode
    pub pipeline: Arc<SpeechPipeline>,
}

impl AppState {
    /// Create state with an empty model handle (model still loading)
    pub fn new(config: Settings) -> Self {
        Self::with_model(config, Arc::new(ModelHandle::new()))
    }

    /// Create state around an existing model handle
    pub fn with_model(config: Settings, model: Arc<ModelHandle>) -> Self {
        let resolver = AccentResolver::new(AccentLibrary::builtin(), &config.audio.reference_dir);
        let pipeline = SpeechPipeline::new(
            resolver,
            Arc::clone(&model),
            config.synthesis.max_concurrent,
        );

        Self {
            config: Arc::new(config),
            model,
            pipeline: Arc::new(pipeline),
        }
    }
}
