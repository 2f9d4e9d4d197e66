//! The generation engine seam between the summarization service and a model.

use serde::{Deserialize, Serialize};

use crate::core::errors::SummarizerResult;

/// Decoding parameters forwarded from a request to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens.
    pub max_length: usize,
    /// Generated tokens required before end-of-sequence is allowed.
    pub min_length: usize,
    /// Sample instead of decoding greedily.
    pub do_sample: bool,
}

/// Result of a single generation call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutput {
    /// The single generated text span.
    pub summary_text: String,
    /// Source tokens fed to the encoder.
    pub input_tokens: usize,
    /// Whether the source was cut to fit the input ceiling.
    pub truncated: bool,
    /// Tokens produced by the decoder, end-of-sequence excluded.
    pub generated_tokens: usize,
}

/// Trait abstraction over sequence-to-sequence generation engines.
///
/// Engines are serially reusable: they take `&mut self` and the service
/// guarantees no concurrent calls on one instance.
pub trait GenerationEngine: Send {
    /// Generate exactly one candidate sequence for `text`.
    ///
    /// # Errors
    /// Returns an error if encoding, decoding or detokenization fails.
    fn generate(&mut self, text: &str, params: &GenerationParams)
    -> SummarizerResult<GenerationOutput>;

    /// Label of the device the engine runs on.
    fn device_label(&self) -> &str;
}

/// Type-erased engine, so a service can hold either a model or a test double.
pub type DynEngine = Box<dyn GenerationEngine>;

impl<E: GenerationEngine + ?Sized> GenerationEngine for Box<E> {
    fn generate(
        &mut self,
        text: &str,
        params: &GenerationParams,
    ) -> SummarizerResult<GenerationOutput> {
        (**self).generate(text, params)
    }

    fn device_label(&self) -> &str {
        (**self).device_label()
    }
}
