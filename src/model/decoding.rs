//! Per-step decoding constraints and token selection.
//!
//! These helpers work on plain logit slices so that the length and
//! repetition rules can be checked without loading a model.

use candle_core::{Device, Tensor};
use candle_transformers::generation::{LogitsProcessor, Sampling};

use crate::core::config::DecodingConfig;
use crate::core::errors::SummarizerResult;
use crate::model::engine::GenerationParams;

/// Tokens that must not be produced at the next decoding step.
///
/// End-of-sequence is banned until `min_length` tokens exist, and any token
/// that would repeat an n-gram of `no_repeat_ngram_size` is banned as well.
#[must_use]
pub fn banned_tokens(
    generated: &[u32],
    params: &GenerationParams,
    eos_token_id: u32,
    no_repeat_ngram_size: usize,
) -> Vec<u32> {
    let mut banned = repeated_ngram_tokens(generated, no_repeat_ngram_size);
    if generated.len() < params.min_length {
        banned.push(eos_token_id);
    }
    banned
}

/// Tokens that would complete an n-gram already present in `generated`.
#[must_use]
pub fn repeated_ngram_tokens(generated: &[u32], n: usize) -> Vec<u32> {
    if n == 0 || generated.len() < n {
        return Vec::new();
    }

    let prefix = &generated[generated.len() - (n - 1)..];
    generated
        .windows(n)
        .filter(|window| &window[..n - 1] == prefix)
        .map(|window| window[n - 1])
        .collect()
}

/// Push the given token logits to negative infinity.
pub fn suppress_tokens(logits: &mut [f32], tokens: &[u32]) {
    for &token in tokens {
        if let Some(slot) = logits.get_mut(token as usize) {
            *slot = f32::NEG_INFINITY;
        }
    }
}

/// Picks the next token either greedily or by top-k sampling.
pub struct TokenSelector {
    processor: LogitsProcessor,
}

impl TokenSelector {
    /// Build a selector for one generation call.
    #[must_use]
    pub fn new(do_sample: bool, decoding: &DecodingConfig) -> Self {
        let sampling = if do_sample {
            Sampling::TopK {
                k: decoding.top_k,
                temperature: decoding.temperature,
            }
        } else {
            Sampling::ArgMax
        };
        let seed = decoding.seed.unwrap_or_else(rand::random::<u64>);
        Self {
            processor: LogitsProcessor::from_sampling(seed, sampling),
        }
    }

    /// Select the next token from a constrained logit vector.
    ///
    /// # Errors
    /// Returns an error if the logits cannot be turned into a tensor or sampled.
    pub fn select(&mut self, logits: &[f32]) -> SummarizerResult<u32> {
        let logits = Tensor::new(logits, &Device::Cpu)?;
        Ok(self.processor.sample(&logits)?)
    }
}
