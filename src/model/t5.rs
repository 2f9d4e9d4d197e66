//! T5 encoder-decoder generation engine backed by candle.

use candle_core::{DType, Device, Tensor};
use candle_transformers::models::t5;
use tokenizers::Tokenizer;
use tracing::{debug, warn};

use crate::core::config::DecodingConfig;
use crate::core::errors::{SummarizerError, SummarizerResult};
use crate::model::decoding::{TokenSelector, banned_tokens, suppress_tokens};
use crate::model::device::device_label;
use crate::model::engine::{GenerationEngine, GenerationOutput, GenerationParams};

/// A loaded T5 checkpoint together with its tokenizer and device.
pub struct T5Engine {
    model: t5::T5ForConditionalGeneration,
    tokenizer: Tokenizer,
    config: t5::Config,
    device: Device,
    decoding: DecodingConfig,
    max_input_tokens: usize,
}

impl T5Engine {
    /// Assemble an engine from already loaded parts.
    #[must_use]
    pub fn new(
        model: t5::T5ForConditionalGeneration,
        tokenizer: Tokenizer,
        config: t5::Config,
        device: Device,
        decoding: DecodingConfig,
        max_input_tokens: usize,
    ) -> Self {
        Self {
            model,
            tokenizer,
            config,
            device,
            decoding,
            max_input_tokens,
        }
    }

    fn eos_token_id(&self) -> SummarizerResult<u32> {
        token_id(self.config.eos_token_id)
    }

    fn decoder_start_token_id(&self) -> SummarizerResult<u32> {
        token_id(
            self.config
                .decoder_start_token_id
                .unwrap_or(self.config.pad_token_id),
        )
    }

    fn encode_source(&self, text: &str) -> SummarizerResult<(Vec<u32>, bool)> {
        let source = format!("{}{}", self.decoding.task_prefix, text);
        let encoding = self
            .tokenizer
            .encode(source, true)
            .map_err(|e| SummarizerError::Tokenizer(e.to_string()))?;
        Ok(truncate_input(
            encoding.get_ids(),
            self.max_input_tokens,
            self.eos_token_id()?,
        ))
    }

    fn decode_loop(
        &mut self,
        encoder_output: &Tensor,
        params: &GenerationParams,
    ) -> SummarizerResult<Vec<u32>> {
        let eos = self.eos_token_id()?;
        let start = self.decoder_start_token_id()?;
        let mut selector = TokenSelector::new(params.do_sample, &self.decoding);
        let mut generated: Vec<u32> = Vec::with_capacity(params.max_length);

        while generated.len() < params.max_length {
            let decoder_input = match generated.last() {
                Some(&last) if self.config.use_cache => {
                    Tensor::new(&[last], &self.device)?.unsqueeze(0)?
                }
                _ => {
                    let mut ids = Vec::with_capacity(generated.len() + 1);
                    ids.push(start);
                    ids.extend_from_slice(&generated);
                    Tensor::new(ids.as_slice(), &self.device)?.unsqueeze(0)?
                }
            };

            let logits = self
                .model
                .decode(&decoder_input, encoder_output)?
                .squeeze(0)?
                .to_dtype(DType::F32)?;
            let mut logits = logits.to_vec1::<f32>()?;

            let banned = banned_tokens(
                &generated,
                params,
                eos,
                self.decoding.no_repeat_ngram_size,
            );
            suppress_tokens(&mut logits, &banned);

            let next = selector.select(&logits)?;
            if next == eos {
                break;
            }
            generated.push(next);
        }

        Ok(generated)
    }
}

impl GenerationEngine for T5Engine {
    fn generate(
        &mut self,
        text: &str,
        params: &GenerationParams,
    ) -> SummarizerResult<GenerationOutput> {
        let (input_ids, truncated) = self.encode_source(text)?;
        if truncated {
            warn!(
                max_input_tokens = self.max_input_tokens,
                "source text truncated to the model input ceiling"
            );
        }

        // Decoder state from a previous (possibly failed) call must not leak.
        self.model.clear_kv_cache();

        let input = Tensor::new(input_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let encoder_output = self.model.encode(&input)?;
        let generated = self.decode_loop(&encoder_output, params);
        self.model.clear_kv_cache();
        let generated = generated?;

        debug!(
            input_tokens = input_ids.len(),
            generated_tokens = generated.len(),
            "decoding finished"
        );

        let summary_text = self
            .tokenizer
            .decode(&generated, true)
            .map_err(|e| SummarizerError::Tokenizer(e.to_string()))?;

        Ok(GenerationOutput {
            summary_text,
            input_tokens: input_ids.len(),
            truncated,
            generated_tokens: generated.len(),
        })
    }

    fn device_label(&self) -> &str {
        device_label(&self.device)
    }
}

fn token_id(id: usize) -> SummarizerResult<u32> {
    u32::try_from(id).map_err(|_| SummarizerError::ModelLoad(format!("token id {id} out of range")))
}

/// Cut `ids` to `max_tokens`, keeping a trailing end-of-sequence marker.
fn truncate_input(ids: &[u32], max_tokens: usize, eos_token_id: u32) -> (Vec<u32>, bool) {
    if ids.len() <= max_tokens {
        return (ids.to_vec(), false);
    }

    let keep = max_tokens.saturating_sub(1);
    let mut truncated = Vec::with_capacity(max_tokens);
    truncated.extend_from_slice(&ids[..keep]);
    truncated.push(eos_token_id);
    (truncated, true)
}
