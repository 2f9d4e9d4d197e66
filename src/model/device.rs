//! Compute device selection.
//!
//! The device is chosen once, when the model is loaded, and never
//! re-evaluated per request.

use std::fmt;
use std::str::FromStr;

use candle_core::Device;
use serde::{Deserialize, Serialize};

use crate::core::errors::{SummarizerError, SummarizerResult};

/// Which compute device the model should be placed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePreference {
    /// Accelerator when the runtime reports one, CPU otherwise.
    #[default]
    Auto,
    /// Always the general-purpose processor.
    Cpu,
    /// CUDA device 0; fails when unavailable.
    Cuda,
}

impl FromStr for DevicePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda),
            other => Err(format!("unknown device '{other}', expected auto, cpu or cuda")),
        }
    }
}

impl fmt::Display for DevicePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
        };
        f.write_str(name)
    }
}

/// Resolve a preference into a concrete device.
///
/// # Errors
/// Returns an error if CUDA is explicitly requested but not available, or if
/// the device cannot be initialised.
pub fn select_device(preference: DevicePreference) -> SummarizerResult<Device> {
    match preference {
        DevicePreference::Auto => Ok(Device::cuda_if_available(0)?),
        DevicePreference::Cpu => Ok(Device::Cpu),
        DevicePreference::Cuda => {
            if candle_core::utils::cuda_is_available() {
                Ok(Device::new_cuda(0)?)
            } else {
                Err(SummarizerError::InvalidConfig(
                    "cuda device requested but this build has no CUDA support".to_string(),
                ))
            }
        }
    }
}

/// Short human-readable label for a device.
#[must_use]
pub fn device_label(device: &Device) -> &'static str {
    if device.is_cuda() {
        "cuda"
    } else if device.is_metal() {
        "metal"
    } else {
        "cpu"
    }
}
