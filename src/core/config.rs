//! Configuration for the summarizer.
//!
//! Every value has a default and can be overridden from the environment with
//! the `SUMMARIZER_*` variables listed on [`SummarizerConfig::from_env`].

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{SummarizerError, SummarizerResult};
use crate::model::device::DevicePreference;

/// Installation root override.
pub const ENV_HOME: &str = "SUMMARIZER_HOME";
/// Device preference override (`auto`, `cpu`, `cuda`).
pub const ENV_DEVICE: &str = "SUMMARIZER_DEVICE";
/// HTTP port override.
pub const ENV_PORT: &str = "SUMMARIZER_PORT";
/// Input token ceiling override.
pub const ENV_MAX_INPUT_TOKENS: &str = "SUMMARIZER_MAX_INPUT_TOKENS";
/// Target token ceiling override.
pub const ENV_MAX_TARGET_TOKENS: &str = "SUMMARIZER_MAX_TARGET_TOKENS";
/// Task prefix prepended to the source text.
pub const ENV_TASK_PREFIX: &str = "SUMMARIZER_TASK_PREFIX";
/// Top-k cutoff used when sampling.
pub const ENV_TOP_K: &str = "SUMMARIZER_TOP_K";
/// Sampling temperature.
pub const ENV_TEMPERATURE: &str = "SUMMARIZER_TEMPERATURE";
/// N-gram repetition blocking size.
pub const ENV_NO_REPEAT_NGRAM: &str = "SUMMARIZER_NO_REPEAT_NGRAM";
/// Fixed sampling seed.
pub const ENV_SEED: &str = "SUMMARIZER_SEED";

/// Top-level summarizer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Installation root; artifacts are resolved under `<root>/assets`.
    pub install_root: PathBuf,
    /// Compute device preference.
    pub device: DevicePreference,
    /// Token ceilings enforced on requests and inputs.
    pub limits: GenerationLimits,
    /// Engine-side decoding settings.
    pub decoding: DecodingConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("."),
            device: DevicePreference::Auto,
            limits: GenerationLimits::default(),
            decoding: DecodingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SummarizerConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the installation root.
    #[must_use]
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = root.into();
        self
    }

    /// Set the device preference.
    #[must_use]
    pub const fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    /// Set the token ceilings.
    #[must_use]
    pub const fn with_limits(mut self, limits: GenerationLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the HTTP port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Load configuration from the process environment.
    ///
    /// Recognised variables: `SUMMARIZER_HOME`, `SUMMARIZER_DEVICE`,
    /// `SUMMARIZER_PORT`, `SUMMARIZER_MAX_INPUT_TOKENS`,
    /// `SUMMARIZER_MAX_TARGET_TOKENS`, `SUMMARIZER_TASK_PREFIX`,
    /// `SUMMARIZER_TOP_K`, `SUMMARIZER_TEMPERATURE`,
    /// `SUMMARIZER_NO_REPEAT_NGRAM` and `SUMMARIZER_SEED`.
    ///
    /// # Errors
    /// Returns an error if a variable cannot be parsed or the result is invalid.
    pub fn from_env() -> SummarizerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns an error if a value cannot be parsed or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> SummarizerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup(ENV_HOME) {
            config.install_root = PathBuf::from(root);
        }
        if let Some(device) = parse_var(&lookup, ENV_DEVICE)? {
            config.device = device;
        }
        if let Some(port) = parse_var(&lookup, ENV_PORT)? {
            config.server.port = port;
        }
        if let Some(max_input) = parse_var(&lookup, ENV_MAX_INPUT_TOKENS)? {
            config.limits.max_input_tokens = max_input;
        }
        if let Some(max_target) = parse_var(&lookup, ENV_MAX_TARGET_TOKENS)? {
            config.limits.max_target_tokens = max_target;
        }
        if let Some(prefix) = lookup(ENV_TASK_PREFIX) {
            config.decoding.task_prefix = prefix;
        }
        if let Some(top_k) = parse_var(&lookup, ENV_TOP_K)? {
            config.decoding.top_k = top_k;
        }
        if let Some(temperature) = parse_var(&lookup, ENV_TEMPERATURE)? {
            config.decoding.temperature = temperature;
        }
        if let Some(ngram) = parse_var(&lookup, ENV_NO_REPEAT_NGRAM)? {
            config.decoding.no_repeat_ngram_size = ngram;
        }
        config.decoding.seed = parse_var(&lookup, ENV_SEED)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> SummarizerResult<()> {
        if self.limits.max_input_tokens == 0 {
            return Err(SummarizerError::InvalidConfig(
                "limits.max_input_tokens must be > 0".to_string(),
            ));
        }

        if self.limits.max_target_tokens == 0 {
            return Err(SummarizerError::InvalidConfig(
                "limits.max_target_tokens must be > 0".to_string(),
            ));
        }

        if self.decoding.top_k == 0 {
            return Err(SummarizerError::InvalidConfig(
                "decoding.top_k must be > 0".to_string(),
            ));
        }

        if !(self.decoding.temperature.is_finite() && self.decoding.temperature > 0.0) {
            return Err(SummarizerError::InvalidConfig(
                "decoding.temperature must be a positive number".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> SummarizerResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SummarizerError::InvalidConfig(format!("{key}={raw:?}: {e}"))),
    }
}

/// Token ceilings tied to the model's supported input and output lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationLimits {
    /// Source tokens fed to the encoder; longer inputs are truncated.
    pub max_input_tokens: usize,
    /// Hard ceiling for `max_length` and `min_length` on a request.
    pub max_target_tokens: usize,
}

impl Default for GenerationLimits {
    fn default() -> Self {
        Self {
            max_input_tokens: 1024,
            max_target_tokens: 512,
        }
    }
}

/// Decoding settings applied by the engine on every call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodingConfig {
    /// Prefix prepended to the source text (T5 checkpoints expect `summarize: `).
    pub task_prefix: String,
    /// Top-k cutoff when sampling.
    pub top_k: usize,
    /// Sampling temperature.
    pub temperature: f64,
    /// Block repeated n-grams of this size; `0` disables blocking.
    pub no_repeat_ngram_size: usize,
    /// Fixed sampling seed, random per request when absent.
    pub seed: Option<u64>,
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            task_prefix: "summarize: ".to_string(),
            top_k: 50,
            temperature: 1.0,
            no_repeat_ngram_size: 3,
            seed: None,
        }
    }
}

/// HTTP server settings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = SummarizerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_input_tokens, 1024);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.device, DevicePreference::Auto);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = SummarizerConfig::from_lookup(lookup_from(&[
            (ENV_HOME, "/opt/summarizer"),
            (ENV_DEVICE, "cpu"),
            (ENV_PORT, "8080"),
            (ENV_MAX_TARGET_TOKENS, "256"),
            (ENV_NO_REPEAT_NGRAM, "0"),
            (ENV_SEED, "42"),
        ]))
        .unwrap();

        assert_eq!(config.install_root, PathBuf::from("/opt/summarizer"));
        assert_eq!(config.device, DevicePreference::Cpu);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.limits.max_target_tokens, 256);
        assert_eq!(config.decoding.no_repeat_ngram_size, 0);
        assert_eq!(config.decoding.seed, Some(42));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = SummarizerConfig::from_lookup(lookup_from(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains(ENV_PORT));
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = SummarizerConfig::new().with_limits(GenerationLimits {
            max_input_tokens: 1024,
            max_target_tokens: 0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_temperature() {
        let mut config = SummarizerConfig::default();
        config.decoding.temperature = 0.0;
        assert!(config.validate().is_err());
    }
}
