//! Summarization service: validation, generation, normalization and results.

pub mod normalize;
pub mod service;
pub mod stats;
pub mod types;
pub mod validation;

pub use service::SummarizationService;
pub use stats::CompressionStats;
pub use types::{SummarizationRequest, SummarizationResponse, SummaryStatus};
