//! Configuration management for the TTS backend
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`AKSA_TTS__` prefix, `__` separator)

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, load_settings_from, AudioConfig, DevicePreference, ModelConfig,
    ObservabilityConfig, ServerConfig, Settings, SynthesisConfig, TtsEngine,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
