//! The request-to-response contract of the summarizer.
//!
//! [`SummarizationService::summarize`] maps every request to a
//! [`SummarizationResponse`]: invalid requests are rejected before the engine
//! runs, and engine errors or panics are converted into `error` responses
//! instead of escaping to the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

use tracing::{debug, error, info, info_span, warn};

use crate::core::config::{GenerationLimits, SummarizerConfig};
use crate::core::errors::{SummarizerError, SummarizerResult};
use crate::core::ids::RequestId;
use crate::model::engine::{DynEngine, GenerationEngine, GenerationOutput, GenerationParams};
use crate::model::provider::ModelProvider;
use crate::summarization::normalize::SummaryNormalizer;
use crate::summarization::types::{SummarizationRequest, SummarizationResponse};
use crate::summarization::validation::validate_request;

/// Summarization service owning a single generation engine.
///
/// The engine is serially reusable; concurrent callers are serialized on an
/// internal mutex.
pub struct SummarizationService<E: GenerationEngine> {
    engine: Mutex<E>,
    limits: GenerationLimits,
    normalizer: SummaryNormalizer,
    device: String,
}

impl SummarizationService<DynEngine> {
    /// Load the model described by `config` and wrap it in a service.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the artifacts
    /// cannot be loaded.
    pub fn from_config(config: &SummarizerConfig) -> SummarizerResult<Self> {
        config.validate()?;
        let provider = ModelProvider::from_config(config);
        info!(
            model_dir = %provider.paths().model_dir.display(),
            tokenizer_dir = %provider.paths().tokenizer_dir.display(),
            "loading summarization model"
        );
        let engine: DynEngine = Box::new(provider.load()?);
        Self::new(engine, config.limits)
    }
}

impl<E: GenerationEngine> SummarizationService<E> {
    /// Wrap an already loaded engine.
    ///
    /// # Errors
    /// Returns an error if the output cleanup patterns fail to compile.
    pub fn new(engine: E, limits: GenerationLimits) -> SummarizerResult<Self> {
        let device = engine.device_label().to_string();
        Ok(Self {
            engine: Mutex::new(engine),
            limits,
            normalizer: SummaryNormalizer::new()?,
            device,
        })
    }

    /// Token ceilings enforced on requests.
    #[must_use]
    pub const fn limits(&self) -> &GenerationLimits {
        &self.limits
    }

    /// Label of the device the engine runs on.
    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Summarize one document.
    ///
    /// Blocks until generation completes. Never panics on generation
    /// failure; inspect the response status instead.
    pub fn summarize(&self, request: &SummarizationRequest) -> SummarizationResponse {
        let request_id = RequestId::new();
        let span = info_span!("summarize", %request_id);
        let _enter = span.enter();

        debug!(
            chars = request.text.chars().count(),
            max_length = request.max_length,
            min_length = request.min_length,
            do_sample = request.do_sample,
            "summarization requested"
        );

        let response = match self.try_summarize(request) {
            Ok(summary) => SummarizationResponse::success(summary),
            Err(err) if err.is_caller_error() => {
                warn!(error = %err, "request rejected");
                SummarizationResponse::error(err.to_string())
            }
            Err(err) => {
                error!(error = %err, "summarization failed");
                SummarizationResponse::error(err.to_string())
            }
        };

        debug!(status = %response.status(), "request resolved");
        response
    }

    fn try_summarize(&self, request: &SummarizationRequest) -> SummarizerResult<String> {
        let params = validate_request(request, &self.limits)?;
        let output = self.run_engine(&request.text, &params)?;

        debug!(
            input_tokens = output.input_tokens,
            truncated = output.truncated,
            generated_tokens = output.generated_tokens,
            "generation complete"
        );

        let summary = self.normalizer.normalize(&output.summary_text);
        if summary.is_empty() {
            return Err(SummarizerError::Generation(
                "model produced an empty summary".to_string(),
            ));
        }
        Ok(summary)
    }

    fn run_engine(
        &self,
        text: &str,
        params: &GenerationParams,
    ) -> SummarizerResult<GenerationOutput> {
        // Engines reset their decoder state per call, so a poisoned lock is safe to reuse.
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        panic::catch_unwind(AssertUnwindSafe(|| engine.generate(text, params)))
            .unwrap_or_else(|payload| Err(SummarizerError::Generation(panic_message(&*payload))))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("engine panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("engine panicked: {msg}")
    } else {
        "engine panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    use super::*;
    use crate::summarization::types::SummaryStatus;

    /// What the mock engine does when called.
    #[derive(Clone, Copy)]
    enum Behavior {
        /// Return the first `max_length` words of the input.
        Echo,
        /// Return an error.
        Fail,
        /// Panic on the first call, echo afterwards.
        PanicOnce,
        /// Return whitespace only.
        Blank,
    }

    struct MockEngine {
        behavior: Behavior,
        calls: Arc<AtomicUsize>,
        in_flight: Arc<AtomicBool>,
    }

    impl MockEngine {
        fn new(behavior: Behavior) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let engine = Self {
                behavior,
                calls: Arc::clone(&calls),
                in_flight: Arc::new(AtomicBool::new(false)),
            };
            (engine, calls)
        }
    }

    impl GenerationEngine for MockEngine {
        fn generate(
            &mut self,
            text: &str,
            params: &GenerationParams,
        ) -> SummarizerResult<GenerationOutput> {
            assert!(
                !self.in_flight.swap(true, Ordering::SeqCst),
                "concurrent call into the engine"
            );
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(2));

            let result = match self.behavior {
                Behavior::Fail => Err(SummarizerError::Generation(
                    "CUDA out of memory".to_string(),
                )),
                Behavior::PanicOnce if call == 0 => {
                    self.in_flight.store(false, Ordering::SeqCst);
                    panic!("index out of bounds in decoder");
                }
                Behavior::Blank => Ok(output("  \n ", text, 0)),
                Behavior::Echo | Behavior::PanicOnce => {
                    let words: Vec<&str> =
                        text.split_whitespace().take(params.max_length).collect();
                    Ok(output(&words.join(" "), text, words.len()))
                }
            };

            self.in_flight.store(false, Ordering::SeqCst);
            result
        }

        fn device_label(&self) -> &str {
            "mock"
        }
    }

    fn output(summary: &str, text: &str, generated: usize) -> GenerationOutput {
        GenerationOutput {
            summary_text: summary.to_string(),
            input_tokens: text.split_whitespace().count(),
            truncated: false,
            generated_tokens: generated,
        }
    }

    fn service(behavior: Behavior) -> (SummarizationService<MockEngine>, Arc<AtomicUsize>) {
        let (engine, calls) = MockEngine::new(behavior);
        (
            SummarizationService::new(engine, GenerationLimits::default()).unwrap(),
            calls,
        )
    }

    fn article(words: usize) -> String {
        (0..words)
            .map(|i| format!("word{i}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_valid_request_succeeds() {
        let (service, calls) = service(Behavior::Echo);
        let response = service.summarize(&SummarizationRequest::new("The council approved the budget."));

        assert_eq!(response.status(), SummaryStatus::Success);
        assert!(!response.summary().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_inverted_bounds_never_reach_engine() {
        let (service, calls) = service(Behavior::Echo);
        let request = SummarizationRequest::new("Some text")
            .with_max_length(10)
            .with_min_length(50);

        let response = service.summarize(&request);

        assert_eq!(response.status(), SummaryStatus::Error);
        assert!(response.summary().contains("min_length"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        let (service, calls) = service(Behavior::Echo);
        let response = service.summarize(&SummarizationRequest::new(""));

        assert_eq!(response.status(), SummaryStatus::Error);
        assert!(!response.summary().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_greedy_decoding_is_idempotent() {
        let (service, _) = service(Behavior::Echo);
        let request = SummarizationRequest::new(article(200));

        assert_eq!(service.summarize(&request), service.summarize(&request));
    }

    #[test]
    fn test_sampling_calls_succeed() {
        let (service, calls) = service(Behavior::Echo);
        let request = SummarizationRequest::new(article(50)).with_sampling(true);

        assert!(service.summarize(&request).is_success());
        assert!(service.summarize(&request).is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_long_article_is_shortened() {
        let (service, _) = service(Behavior::Echo);
        let request = SummarizationRequest::new(article(500))
            .with_max_length(70)
            .with_min_length(30);

        let response = service.summarize(&request);

        assert!(response.is_success());
        let words = response.summary().split_whitespace().count();
        assert!(words <= 70);
        assert!(words < 500);
    }

    #[test]
    fn test_engine_failure_is_contained() {
        let (service, calls) = service(Behavior::Fail);
        let response = service.summarize(&SummarizationRequest::new("Some text"));

        assert_eq!(response.status(), SummaryStatus::Error);
        assert_eq!(response.summary(), "generation failed: CUDA out of memory");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_engine_panic_is_contained_and_service_recovers() {
        let (service, calls) = service(Behavior::PanicOnce);
        let request = SummarizationRequest::new("Some text to summarize");

        let first = service.summarize(&request);
        assert_eq!(first.status(), SummaryStatus::Error);
        assert!(first.summary().contains("index out of bounds in decoder"));

        let second = service.summarize(&request);
        assert!(second.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_blank_generation_is_not_a_success() {
        let (service, _) = service(Behavior::Blank);
        let response = service.summarize(&SummarizationRequest::new("Some text"));

        assert_eq!(response.status(), SummaryStatus::Error);
        assert!(response.summary().contains("empty summary"));
    }

    #[test]
    fn test_concurrent_callers_are_serialized() {
        let (service, calls) = service(Behavior::Echo);
        let service = Arc::new(service);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.summarize(&SummarizationRequest::new(article(40))))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_success());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn test_from_config_fails_without_artifacts() {
        let config = SummarizerConfig::new()
            .with_install_root("/nonexistent/summarizer-root")
            .with_device(crate::model::DevicePreference::Cpu);

        match SummarizationService::from_config(&config) {
            Err(SummarizerError::ModelLoad(msg)) => assert!(msg.contains("config.json")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("service should not start without artifacts"),
        }
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = SummarizerConfig::new();
        config.decoding.top_k = 0;

        assert!(matches!(
            SummarizationService::from_config(&config),
            Err(SummarizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_quoted_summary_survives_normalization() {
        let (service, _) = service(Behavior::Echo);
        let request = SummarizationRequest::new("The board called it 'done' at 3 : 1 .");

        let response = service.summarize(&request);

        assert_eq!(response.summary(), "The board called it 'done' at 3 : 1.");
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_request_log_counts_characters() {
        let (service, _) = service(Behavior::Echo);
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        // 10 characters, 12 bytes.
        tracing::subscriber::with_default(subscriber, || {
            service.summarize(&SummarizationRequest::new("café naïve"));
        });

        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("chars=10"), "{logs}");
    }

    #[test]
    fn test_reports_engine_device() {
        let (service, _) = service(Behavior::Echo);
        assert_eq!(service.device(), "mock");
        assert_eq!(service.limits().max_target_tokens, 512);
    }
}
