//! Request checks performed before the engine is invoked.

use crate::core::config::GenerationLimits;
use crate::core::errors::{SummarizerError, SummarizerResult};
use crate::model::engine::GenerationParams;
use crate::summarization::types::SummarizationRequest;

/// Validate a request and derive the engine parameters from it.
///
/// Out-of-range values are rejected, never clamped.
///
/// # Errors
/// Returns [`SummarizerError::InvalidRequest`] describing the first violation.
pub fn validate_request(
    request: &SummarizationRequest,
    limits: &GenerationLimits,
) -> SummarizerResult<GenerationParams> {
    if request.text.trim().is_empty() {
        return Err(SummarizerError::InvalidRequest(
            "text must not be empty".to_string(),
        ));
    }

    check_bound("max_length", request.max_length, limits.max_target_tokens)?;
    check_bound("min_length", request.min_length, limits.max_target_tokens)?;

    if request.min_length > request.max_length {
        return Err(SummarizerError::InvalidRequest(format!(
            "min_length ({}) must not exceed max_length ({})",
            request.min_length, request.max_length
        )));
    }

    Ok(GenerationParams {
        max_length: request.max_length,
        min_length: request.min_length,
        do_sample: request.do_sample,
    })
}

fn check_bound(name: &str, value: usize, ceiling: usize) -> SummarizerResult<()> {
    if value == 0 || value > ceiling {
        return Err(SummarizerError::InvalidRequest(format!(
            "{name} must be between 1 and {ceiling}, got {value}"
        )));
    }
    Ok(())
}
