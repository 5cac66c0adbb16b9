//! Core types and traits for the Aksa TTS backend
//!
//! This crate holds everything the other crates agree on:
//! - Audio value types (`Waveform`)
//! - The request shape accepted by the HTTP surface (`TtsRequest`)
//! - Compute device identifiers
//! - The `SpeechModel` / `PretrainedModel` seams behind which the
//!   neural model lives
//! - Error types shared across crates

pub mod audio;
pub mod device;
pub mod error;
pub mod request;
pub mod traits;

pub use audio::Waveform;
pub use device::ComputeDevice;
pub use error::{AudioError, ModelError};
pub use request::TtsRequest;
pub use traits::{PretrainedModel, SpeechModel};
