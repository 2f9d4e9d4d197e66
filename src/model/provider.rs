//! Loads the model and tokenizer artifacts into a ready-to-call engine.
//!
//! Artifacts live at fixed locations under the installation root:
//!
//! ```text
//! <root>/assets/model/config.json
//! <root>/assets/model/model.safetensors
//! <root>/assets/tokenizer/tokenizer.json
//! ```
//!
//! A missing or malformed artifact is a configuration error: loading happens
//! once at startup and is never retried per request.

use std::path::{Path, PathBuf};

use candle_core::DType;
use candle_nn::VarBuilder;
use candle_transformers::models::t5;
use tokenizers::Tokenizer;
use tracing::info;

use crate::core::config::{DecodingConfig, SummarizerConfig};
use crate::core::errors::{SummarizerError, SummarizerResult};
use crate::model::device::{DevicePreference, device_label, select_device};
use crate::model::t5::T5Engine;

/// Model configuration file name inside the model directory.
pub const MODEL_CONFIG_FILE: &str = "config.json";
/// Weights file name inside the model directory.
pub const MODEL_WEIGHTS_FILE: &str = "model.safetensors";
/// Tokenizer file name inside the tokenizer directory.
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Filesystem locations of the model and tokenizer artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    /// Directory holding the model config and weights.
    pub model_dir: PathBuf,
    /// Directory holding the tokenizer definition.
    pub tokenizer_dir: PathBuf,
}

impl ModelPaths {
    /// Resolve the artifact locations relative to an installation root.
    #[must_use]
    pub fn resolve(root: &Path) -> Self {
        let assets = root.join("assets");
        Self {
            model_dir: assets.join("model"),
            tokenizer_dir: assets.join("tokenizer"),
        }
    }

    /// Path of the model configuration file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.model_dir.join(MODEL_CONFIG_FILE)
    }

    /// Path of the weights file.
    #[must_use]
    pub fn weights_file(&self) -> PathBuf {
        self.model_dir.join(MODEL_WEIGHTS_FILE)
    }

    /// Path of the tokenizer file.
    #[must_use]
    pub fn tokenizer_file(&self) -> PathBuf {
        self.tokenizer_dir.join(TOKENIZER_FILE)
    }

    /// Check that every artifact file exists.
    ///
    /// # Errors
    /// Returns an error naming the first missing file.
    pub fn check(&self) -> SummarizerResult<()> {
        for path in [self.config_file(), self.weights_file(), self.tokenizer_file()] {
            if !path.is_file() {
                return Err(SummarizerError::ModelLoad(format!(
                    "missing artifact {}",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Produces a generation engine bound to the pretrained artifacts.
#[derive(Clone, Debug)]
pub struct ModelProvider {
    paths: ModelPaths,
    device: DevicePreference,
    decoding: DecodingConfig,
    max_input_tokens: usize,
}

impl ModelProvider {
    /// Create a provider from the summarizer configuration.
    #[must_use]
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self {
            paths: ModelPaths::resolve(&config.install_root),
            device: config.device,
            decoding: config.decoding.clone(),
            max_input_tokens: config.limits.max_input_tokens,
        }
    }

    /// Artifact locations this provider reads.
    #[must_use]
    pub const fn paths(&self) -> &ModelPaths {
        &self.paths
    }

    /// Load the tokenizer and weights onto the selected device.
    ///
    /// # Errors
    /// Returns an error if an artifact is missing or malformed, or if the
    /// device cannot be initialised.
    pub fn load(&self) -> SummarizerResult<T5Engine> {
        self.paths.check()?;

        let tokenizer_file = self.paths.tokenizer_file();
        let tokenizer = Tokenizer::from_file(&tokenizer_file).map_err(|e| {
            SummarizerError::ModelLoad(format!("{}: {e}", tokenizer_file.display()))
        })?;

        let config_file = self.paths.config_file();
        let raw_config = std::fs::read_to_string(&config_file)?;
        let model_config: t5::Config = serde_json::from_str(&raw_config).map_err(|e| {
            SummarizerError::ModelLoad(format!("{}: {e}", config_file.display()))
        })?;

        let device = select_device(self.device)?;
        info!(
            device = device_label(&device),
            preference = %self.device,
            "compute device selected"
        );

        let weights_file = self.paths.weights_file();
        let tensors = candle_core::safetensors::load(&weights_file, &device).map_err(|e| {
            SummarizerError::ModelLoad(format!("{}: {e}", weights_file.display()))
        })?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = t5::T5ForConditionalGeneration::load(vb, &model_config)
            .map_err(|e| SummarizerError::ModelLoad(format!("t5 weights: {e}")))?;

        info!(
            model_dir = %self.paths.model_dir.display(),
            layers = model_config.num_layers,
            vocab_size = model_config.vocab_size,
            "summarization model loaded"
        );

        Ok(T5Engine::new(
            model,
            tokenizer,
            model_config,
            device,
            self.decoding.clone(),
            self.max_input_tokens,
        ))
    }
}
