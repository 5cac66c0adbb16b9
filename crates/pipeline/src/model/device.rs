//! Device resolution

use aksa_tts_config::DevicePreference;
use aksa_tts_core::ComputeDevice;

/// Whether an accelerator can be used by this build
#[cfg(feature = "candle")]
pub fn accelerator_available() -> bool {
    candle_core::utils::cuda_is_available()
}

#[cfg(not(feature = "candle"))]
pub fn accelerator_available() -> bool {
    false
}

/// Turn the configured preference into a concrete device
///
/// An explicit CUDA request falls back to CPU with a warning when no
/// accelerator is usable.
pub fn resolve_device(preference: DevicePreference) -> ComputeDevice {
    resolve_with(preference, accelerator_available())
}

fn resolve_with(preference: DevicePreference, accelerator: bool) -> ComputeDevice {
    match preference {
        DevicePreference::Cpu => ComputeDevice::Cpu,
        DevicePreference::Auto if accelerator => ComputeDevice::Cuda(0),
        DevicePreference::Auto => ComputeDevice::Cpu,
        DevicePreference::Cuda(idx) if accelerator => ComputeDevice::Cuda(idx),
        DevicePreference::Cuda(idx) => {
            tracing::warn!("CUDA:{} requested but no accelerator is available, using CPU", idx);
            ComputeDevice::Cpu
        }
    }
}
