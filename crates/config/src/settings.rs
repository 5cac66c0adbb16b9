//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::constants;
use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model loading configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Reference audio, output and streaming configuration
    #[serde(default)]
    pub audio: AudioConfig,

    /// Synthesis admission configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.chunk_size_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audio.chunk_size_bytes".to_string(),
                message: "Chunk size must be greater than zero".to_string(),
            });
        }

        if self.synthesis.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.max_concurrent".to_string(),
                message: "At least one synthesis slot is required".to_string(),
            });
        }

        if self.model.checkpoint_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "model.checkpoint_file".to_string(),
                message: "Checkpoint file name must not be empty".to_string(),
            });
        }

        if self.model.engine == TtsEngine::Stub && self.model.stub_sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.stub_sample_rate".to_string(),
                message: "Sample rate must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable permissive CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    constants::server::HOST.to_string()
}
fn default_port() -> u16 {
    constants::server::PORT
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
        }
    }
}

/// Which model backend the loader builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    /// Silence generator, for running without the neural runtime
    #[default]
    Stub,
    /// Chatterbox with the Indonesian `t3` checkpoint (requires the `candle` feature)
    Chatterbox,
}

impl fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TtsEngine::Stub => write!(f, "stub"),
            TtsEngine::Chatterbox => write!(f, "chatterbox"),
        }
    }
}

/// Requested device placement
///
/// Parsed from `auto`, `cpu` or `cuda:N` (`cuda` alone means `cuda:0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DevicePreference {
    /// Accelerator if one is available, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda(usize),
}

impl FromStr for DevicePreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "auto" => Ok(DevicePreference::Auto),
            "cpu" => Ok(DevicePreference::Cpu),
            "cuda" | "gpu" => Ok(DevicePreference::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|idx| idx.parse::<usize>().ok())
                .map(DevicePreference::Cuda)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "model.device".to_string(),
                    message: format!("Unknown device '{}', expected auto, cpu or cuda:N", s),
                }),
        }
    }
}

impl TryFrom<String> for DevicePreference {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DevicePreference> for String {
    fn from(pref: DevicePreference) -> Self {
        match pref {
            DevicePreference::Auto => "auto".to_string(),
            DevicePreference::Cpu => "cpu".to_string(),
            DevicePreference::Cuda(idx) => format!("cuda:{}", idx),
        }
    }
}

/// Model loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub engine: TtsEngine,

    #[serde(default)]
    pub device: DevicePreference,

    /// Hub repository holding the base weights
    #[serde(default = "default_base_repo")]
    pub base_repo: String,

    /// Hub repository holding the checkpoint override
    #[serde(default = "default_checkpoint_repo")]
    pub checkpoint_repo: String,

    #[serde(default = "default_checkpoint_file")]
    pub checkpoint_file: String,

    /// Submodule the checkpoint is loaded into
    #[serde(default = "default_checkpoint_submodule")]
    pub checkpoint_submodule: String,

    /// Output rate of the stub engine
    #[serde(default = "default_sample_rate")]
    pub stub_sample_rate: u32,
}

fn default_base_repo() -> String {
    constants::hub::BASE_REPO.to_string()
}
fn default_checkpoint_repo() -> String {
    constants::hub::CHECKPOINT_REPO.to_string()
}
fn default_checkpoint_file() -> String {
    constants::hub::CHECKPOINT_FILE.to_string()
}
fn default_checkpoint_submodule() -> String {
    constants::hub::CHECKPOINT_SUBMODULE.to_string()
}
fn default_sample_rate() -> u32 {
    constants::audio::SAMPLE_RATE
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            engine: TtsEngine::default(),
            device: DevicePreference::default(),
            base_repo: default_base_repo(),
            checkpoint_repo: default_checkpoint_repo(),
            checkpoint_file: default_checkpoint_file(),
            checkpoint_submodule: default_checkpoint_submodule(),
            stub_sample_rate: default_sample_rate(),
        }
    }
}

/// Reference audio, output and streaming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_reference_dir")]
    pub reference_dir: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,

    #[serde(default = "default_chunk_pause_ms")]
    pub chunk_pause_ms: u64,
}

impl AudioConfig {
    pub fn chunk_pause(&self) -> Duration {
        Duration::from_millis(self.chunk_pause_ms)
    }
}

fn default_reference_dir() -> String {
    constants::audio::REFERENCE_DIR.to_string()
}
fn default_output_dir() -> String {
    constants::audio::OUTPUT_DIR.to_string()
}
fn default_chunk_size() -> usize {
    constants::audio::CHUNK_SIZE_BYTES
}
fn default_chunk_pause_ms() -> u64 {
    constants::audio::CHUNK_PAUSE_MS
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            reference_dir: default_reference_dir(),
            output_dir: default_output_dir(),
            chunk_size_bytes: default_chunk_size(),
            chunk_pause_ms: default_chunk_pause_ms(),
        }
    }
}

/// Synthesis admission configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Upper bound on concurrent `generate` calls against the shared model
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    constants::synthesis::MAX_CONCURRENT
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics at `/metrics`
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (AKSA_TTS__ prefix)
/// 2. config/{env}.yaml|toml (if env specified)
/// 3. config/default.yaml|toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`], reading files from `config_dir`
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let file_source = |name: &str| {
        let path = config_dir.join(name);
        File::with_name(&path.to_string_lossy()).required(false)
    };

    let mut builder = Config::builder().add_source(file_source("default"));

    if let Some(env_name) = env {
        builder = builder.add_source(file_source(env_name));
    }

    builder = builder.add_source(
        Environment::with_prefix("AKSA_TTS")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        engine = %settings.model.engine,
        port = settings.server.port,
        "Settings loaded"
    );

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "AKSA_TTS__SERVER__PORT",
        "AKSA_TTS__MODEL__DEVICE",
        "AKSA_TTS__AUDIO__CHUNK_SIZE_BYTES",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.audio.chunk_size_bytes, 1024 * 1024);
        assert_eq!(settings.audio.chunk_pause(), Duration::from_millis(10));
        assert_eq!(settings.model.checkpoint_repo, "grandhigh/Chatterbox-TTS-Indonesian");
        assert_eq!(settings.model.checkpoint_submodule, "t3");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let mut settings = Settings::default();
        settings.audio.chunk_size_bytes = 0;
        assert!(settings.validate().is_err());

        settings.audio.chunk_size_bytes = 4096;
        settings.synthesis.max_concurrent = 0;
        assert!(settings.validate().is_err());

        settings.synthesis.max_concurrent = 2;
        assert!(settings.validate().is_ok());

        settings.model.checkpoint_file = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_device_preference_parsing() {
        assert_eq!("auto".parse::<DevicePreference>().unwrap(), DevicePreference::Auto);
        assert_eq!("CPU".parse::<DevicePreference>().unwrap(), DevicePreference::Cpu);
        assert_eq!("cuda".parse::<DevicePreference>().unwrap(), DevicePreference::Cuda(0));
        assert_eq!("cuda:2".parse::<DevicePreference>().unwrap(), DevicePreference::Cuda(2));
        assert!("tpu".parse::<DevicePreference>().is_err());
        assert!("cuda:x".parse::<DevicePreference>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "server": { "port": 9000 },
            "model": { "engine": "chatterbox", "device": "cuda:1" }
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.model.engine, TtsEngine::Chatterbox);
        assert_eq!(settings.model.device, DevicePreference::Cuda(1));
        assert_eq!(settings.audio.reference_dir, "audio_referensi");
    }

    #[test]
    fn test_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();

        std::env::set_var("AKSA_TTS__SERVER__PORT", "9123");
        std::env::set_var("AKSA_TTS__MODEL__DEVICE", "cuda:1");
        std::env::set_var("AKSA_TTS__AUDIO__CHUNK_SIZE_BYTES", "4096");
        let result = load_settings_from(dir.path(), None);
        clear_env();

        let settings = result.unwrap();
        assert_eq!(settings.server.port, 9123);
        assert_eq!(settings.model.device, DevicePreference::Cuda(1));
        assert_eq!(settings.audio.chunk_size_bytes, 4096);
        assert_eq!(settings.audio.reference_dir, "audio_referensi");
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();

        std::env::set_var("AKSA_TTS__AUDIO__CHUNK_SIZE_BYTES", "0");
        let result = load_settings_from(dir.path(), None);
        clear_env();

        match result {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "audio.chunk_size_bytes")
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_env_file_layers_over_default_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 8100\n\n[audio]\nreference_dir = \"refs\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("production.toml"), "[server]\nport = 8200\n").unwrap();

        let base = load_settings_from(dir.path(), None).unwrap();
        assert_eq!(base.server.port, 8100);
        assert_eq!(base.audio.reference_dir, "refs");

        let layered = load_settings_from(dir.path(), Some("production")).unwrap();
        assert_eq!(layered.server.port, 8200);
        assert_eq!(layered.audio.reference_dir, "refs");

        // Missing files are optional
        let missing = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(missing.server.port, 8100);
    }

    #[test]
    fn test_device_preference_roundtrips_through_string() {
        let value: String = DevicePreference::Cuda(3).into();
        assert_eq!(value, "cuda:3");
    }
}
