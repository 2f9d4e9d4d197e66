//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::summarization::SummarizationService;

pub use crate::model::engine::DynEngine;

/// Shared application state.
pub struct AppState {
    /// The summarization service, owning the single engine instance.
    pub service: SummarizationService<DynEngine>,
}

impl AppState {
    /// Create a new application state around a service.
    #[must_use]
    pub fn new(service: SummarizationService<DynEngine>) -> Arc<Self> {
        Arc::new(Self { service })
    }
}
