//! Core types shared by every layer: configuration, errors and identifiers.

pub mod config;
pub mod errors;
pub mod ids;

pub use config::{DecodingConfig, GenerationLimits, ServerConfig, SummarizerConfig};
pub use errors::{SummarizerError, SummarizerResult};
pub use ids::RequestId;
