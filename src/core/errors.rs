//! Error types for the summarizer.

use thiserror::Error;

/// Summarizer error type.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Request rejected before reaching the model.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Model or tokenizer artifact missing or malformed.
    #[error("failed to load model: {0}")]
    ModelLoad(String),
    /// Tokenizer encode/decode failure.
    #[error("tokenizer error: {0}")]
    Tokenizer(String),
    /// Generation failed inside the engine.
    #[error("generation failed: {0}")]
    Generation(String),
    /// Tensor or device error from candle.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),
    /// Output cleanup pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SummarizerError {
    /// Whether the error was caused by the caller rather than the model.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }
}

/// Convenience result alias for summarizer operations.
pub type SummarizerResult<T> = Result<T, SummarizerError>;
