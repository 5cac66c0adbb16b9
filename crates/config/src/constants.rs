//! Centralized constants for the TTS backend
//!
//! Single source of truth for default values used across crates.

/// Model hub artifacts
pub mod hub {
    /// Base Chatterbox weights
    pub const BASE_REPO: &str = "ResembleAI/chatterbox";

    /// Indonesian fine-tune whose checkpoint overrides the base `t3` weights
    pub const CHECKPOINT_REPO: &str = "grandhigh/Chatterbox-TTS-Indonesian";

    pub const CHECKPOINT_FILE: &str = "t3_cfg.safetensors";

    /// Submodule receiving the checkpoint
    pub const CHECKPOINT_SUBMODULE: &str = "t3";
}

/// HTTP server defaults
pub mod server {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8000;

    /// Body of the liveness endpoint
    pub const STATUS_MESSAGE: &str = "Aksa TTS Backend is running.";
}

/// Audio defaults
pub mod audio {
    /// Chatterbox output rate (Hz)
    pub const SAMPLE_RATE: u32 = 24000;

    /// Streaming chunk size (1 MiB)
    pub const CHUNK_SIZE_BYTES: usize = 1024 * 1024;

    /// Pause after each streamed chunk (ms)
    pub const CHUNK_PAUSE_MS: u64 = 10;

    /// Directory holding one reference recording per accent
    pub const REFERENCE_DIR: &str = "audio_referensi";

    /// Directory receiving files written by the batch binary
    pub const OUTPUT_DIR: &str = "output";
}

/// Synthesis admission defaults
pub mod synthesis {
    /// In-flight synthesis calls allowed on the shared model
    pub const MAX_CONCURRENT: usize = 1;
}
