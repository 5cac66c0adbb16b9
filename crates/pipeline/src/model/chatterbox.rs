//! Chatterbox model weights (Candle)
//!
//! Holds the pretrained Chatterbox weights per submodule and applies the
//! Indonesian `t3` checkpoint on top of them. The acoustic forward pass is
//! provided by the Chatterbox runtime, which is not part of this crate.
//!
//! Until that runtime is linked, `generate` always returns
//! `ModelError::Generation`. With `engine = "chatterbox"` the server reports
//! ready once the weights load, then answers every synthesis request with a
//! 500. Use the `stub` engine for end-to-end runs.
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut model = ChatterboxModel::from_pretrained("ResembleAI/chatterbox", ComputeDevice::Cpu)?;
//! model.load_submodule_weights("t3", &checkpoint_path)?;
//! ```

use std::collections::HashMap;
use std::path::Path;

use aksa_tts_core::{ComputeDevice, ModelError, PretrainedModel, SpeechModel, Waveform};
use candle_core::{Device, Tensor};

use super::hub::fetch_artifact;

/// Chatterbox output rate (S3Gen vocoder)
pub const SAMPLE_RATE: u32 = 24000;

/// Submodule name → weight file in the base repository
const BASE_WEIGHTS: &[(&str, &str)] = &[
    ("ve", "ve.safetensors"),
    ("t3", "t3_cfg.safetensors"),
    ("s3gen", "s3gen.safetensors"),
];

type StateDict = HashMap<String, Tensor>;

pub struct ChatterboxModel {
    device: Device,
    submodules: HashMap<String, StateDict>,
}

fn candle_device(device: ComputeDevice) -> Result<Device, ModelError> {
    match device {
        ComputeDevice::Cpu => Ok(Device::Cpu),
        ComputeDevice::Cuda(idx) => Device::new_cuda(idx)
            .map_err(|e| ModelError::Device(format!("Failed to create CUDA device: {}", e))),
    }
}

impl ChatterboxModel {
    /// Download the base weights from `repo_id` and load them onto `device`
    pub fn from_pretrained(repo_id: &str, device: ComputeDevice) -> Result<Self, ModelError> {
        let device = candle_device(device)?;
        let mut submodules = HashMap::new();

        for (name, file) in BASE_WEIGHTS {
            let path = fetch_artifact(repo_id, file)?;
            let tensors = candle_core::safetensors::load(&path, &device)
                .map_err(|e| ModelError::Load(format!("Failed to load {}: {}", file, e)))?;

            tracing::info!(submodule = %name, tensors = tensors.len(), "Loaded base weights");
            submodules.insert(name.to_string(), tensors);
        }

        Ok(Self { device, submodules })
    }

    pub fn submodule(&self, name: &str) -> Option<&StateDict> {
        self.submodules.get(name)
    }
}

/// Strict state-dict check: same key set, same shape per key
fn verify_state_dict(submodule: &str, current: &StateDict, incoming: &StateDict) -> Result<(), ModelError> {
    let mut missing: Vec<&str> = current
        .keys()
        .filter(|k| !incoming.contains_key(*k))
        .map(String::as_str)
        .collect();
    let mut unexpected: Vec<&str> = incoming
        .keys()
        .filter(|k| !current.contains_key(*k))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        missing.sort_unstable();
        unexpected.sort_unstable();
        return Err(ModelError::checkpoint(
            submodule,
            format!("missing keys {:?}, unexpected keys {:?}", missing, unexpected),
        ));
    }

    for (key, tensor) in incoming {
        let expected = current[key].dims();
        if tensor.dims() != expected {
            return Err(ModelError::checkpoint(
                submodule,
                format!("shape mismatch for {}: expected {:?}, got {:?}", key, expected, tensor.dims()),
            ));
        }
    }

    Ok(())
}

#[async_trait::async_trait]
impl SpeechModel for ChatterboxModel {
    fn name(&self) -> &str {
        "chatterbox"
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    async fn generate(&self, _text: &str, reference_audio: &Path) -> Result<Waveform, ModelError> {
        Err(ModelError::Generation(format!(
            "Chatterbox acoustic runtime is not linked into this build (reference: {})",
            reference_audio.display()
        )))
    }
}

impl PretrainedModel for ChatterboxModel {
    fn load_submodule_weights(
        &mut self,
        submodule: &str,
        checkpoint: &Path,
    ) -> Result<usize, ModelError> {
        // Staged on CPU, moved to the model device after verification
        let incoming = candle_core::safetensors::load(checkpoint, &Device::Cpu)
            .map_err(|e| ModelError::checkpoint(submodule, e.to_string()))?;

        let current = self
            .submodules
            .get(submodule)
            .ok_or_else(|| ModelError::checkpoint(submodule, "unknown submodule"))?;

        verify_state_dict(submodule, current, &incoming)?;

        let mut placed = HashMap::with_capacity(incoming.len());
        for (key, tensor) in incoming {
            let tensor = tensor
                .to_device(&self.device)
                .map_err(|e| ModelError::checkpoint(submodule, format!("{}: {}", key, e)))?;
            placed.insert(key, tensor);
        }

        let applied = placed.len();
        self.submodules.insert(submodule.to_string(), placed);
        Ok(applied)
    }

    fn release_device_cache(&self) {
        // Candle frees device buffers on drop
        tracing::debug!(device = ?self.device, "Device cache released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;

    fn dict(entries: &[(&str, Vec<usize>)]) -> StateDict {
        entries
            .iter()
            .map(|(k, shape)| {
                let tensor = Tensor::zeros(shape.as_slice(), DType::F32, &Device::Cpu).unwrap();
                (k.to_string(), tensor)
            })
            .collect()
    }

    #[test]
    fn test_matching_state_dict_accepted() {
        let current = dict(&[("tfmr.wte.weight", vec![8, 4]), ("cond_enc.spkr_enc.weight", vec![4, 2])]);
        let incoming = dict(&[("tfmr.wte.weight", vec![8, 4]), ("cond_enc.spkr_enc.weight", vec![4, 2])]);
        assert!(verify_state_dict("t3", &current, &incoming).is_ok());
    }

    #[test]
    fn test_missing_and_unexpected_keys_rejected() {
        let current = dict(&[("a", vec![2]), ("b", vec![2])]);
        let incoming = dict(&[("a", vec![2]), ("c", vec![2])]);
        let err = verify_state_dict("t3", &current, &incoming).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"b\""));
        assert!(msg.contains("\"c\""));
    }

    #[tokio::test]
    async fn test_generate_reports_missing_runtime() {
        let model = ChatterboxModel {
            device: Device::Cpu,
            submodules: HashMap::new(),
        };

        let err = model
            .generate("Halo", Path::new("audio_referensi/aksen_jawa_pria.wav"))
            .await
            .unwrap_err();

        assert!(matches!(err, ModelError::Generation(_)));
        assert!(err.to_string().contains("aksen_jawa_pria.wav"));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let current = dict(&[("a", vec![2, 3])]);
        let incoming = dict(&[("a", vec![3, 2])]);
        assert!(verify_state_dict("t3", &current, &incoming).is_err());
    }
}
