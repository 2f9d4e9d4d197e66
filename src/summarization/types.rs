//! Request and response shapes of the summarization service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default upper bound on generated tokens.
pub const DEFAULT_MAX_LENGTH: usize = 130;
/// Default lower bound on generated tokens.
pub const DEFAULT_MIN_LENGTH: usize = 30;

const fn default_max_length() -> usize {
    DEFAULT_MAX_LENGTH
}

const fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

/// A single summarization request.
///
/// Length bounds count subword tokens, not words; a summary's word count is
/// only an approximation of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationRequest {
    /// Source document.
    pub text: String,
    /// Upper bound on generated tokens.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Lower bound on generated tokens, at most `max_length`.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Stochastic decoding instead of greedy decoding.
    #[serde(default)]
    pub do_sample: bool,
}

impl SummarizationRequest {
    /// Create a request with default bounds and greedy decoding.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_length: DEFAULT_MAX_LENGTH,
            min_length: DEFAULT_MIN_LENGTH,
            do_sample: false,
        }
    }

    /// Set the upper length bound.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the lower length bound.
    #[must_use]
    pub const fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Enable or disable sampling.
    #[must_use]
    pub const fn with_sampling(mut self, do_sample: bool) -> Self {
        self.do_sample = do_sample;
        self
    }
}

/// Outcome discriminant of a summarization call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    /// `summary` holds generated text.
    #[default]
    Success,
    /// `summary` holds a diagnostic message.
    Error,
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// The response to a summarization request.
///
/// Built once per request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizationResponse {
    summary: String,
    #[serde(default)]
    status: SummaryStatus,
}

impl SummarizationResponse {
    /// A successful response carrying generated text.
    #[must_use]
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            status: SummaryStatus::Success,
        }
    }

    /// A failed response carrying a diagnostic message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            summary: message.into(),
            status: SummaryStatus::Error,
        }
    }

    /// Generated text or diagnostic message, depending on [`Self::status`].
    #[must_use]
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Outcome discriminant.
    #[must_use]
    pub const fn status(&self) -> SummaryStatus {
        self.status
    }

    /// Whether the call produced a summary.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == SummaryStatus::Success
    }
}
