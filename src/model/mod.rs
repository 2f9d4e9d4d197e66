//! Model provider: artifact loading, device selection and the generation engine.

pub mod decoding;
pub mod device;
pub mod engine;
pub mod provider;
pub mod t5;

pub use device::DevicePreference;
pub use engine::{DynEngine, GenerationEngine, GenerationOutput, GenerationParams};
pub use provider::{ModelPaths, ModelProvider};
pub use t5::T5Engine;
