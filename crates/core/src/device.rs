//! Compute device identifiers

use std::fmt;

/// Device a model runs on once placement has been resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeDevice {
    Cpu,
    Cuda(usize),
}

impl fmt::Display for ComputeDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeDevice::Cpu => write!(f, "CPU"),
            ComputeDevice::Cuda(idx) => write!(f, "CUDA:{}", idx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ComputeDevice::Cpu.to_string(), "CPU");
        assert_eq!(ComputeDevice::Cuda(1).to_string(), "CUDA:1");
    }
}
