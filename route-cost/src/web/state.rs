//! Application state for the web layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cost::CostEngine;
use crate::pricing::InMemoryPriceSource;
use crate::route_provider::StraightLineProvider;

/// Default per-request pricing deadline.
pub const DEFAULT_REQUEST_DEADLINE: Duration = Duration::from_secs(10);

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Pricing engine backed by the in-memory price store
    pub engine: Arc<CostEngine<InMemoryPriceSource>>,

    /// Route provider for trip requests
    pub routes: Arc<StraightLineProvider>,

    /// How long a single request may spend pricing
    pub request_deadline: Duration,

    /// JSON file the price store was loaded from, if any
    pub price_data: Option<PathBuf>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: CostEngine<InMemoryPriceSource>, routes: StraightLineProvider) -> Self {
        Self {
            engine: Arc::new(engine),
            routes: Arc::new(routes),
            request_deadline: DEFAULT_REQUEST_DEADLINE,
            price_data: None,
        }
    }

    pub fn with_request_deadline(mut self, deadline: Duration) -> Self {
        self.request_deadline = deadline;
        self
    }

    /// Enable reloading the price store from `path`.
    pub fn with_price_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.price_data = Some(path.into());
        self
    }
}
