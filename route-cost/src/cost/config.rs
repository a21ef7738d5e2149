//! Configuration for the cost engine.

use std::time::Duration;

use crate::domain::{CountryCode, CurrencyCode};

/// Configuration parameters for route pricing.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of route points classified per request.
    /// Points are sampled evenly by index; the last point is always included.
    pub sample_budget: usize,

    /// Country assumed when no sampled point could be classified.
    pub fallback_country: CountryCode,

    /// Bound on each price source call.
    /// A call that takes longer is treated as failed and the next tier runs.
    pub price_source_timeout: Duration,

    /// Currency every amount is converted into.
    pub reference_currency: CurrencyCode,
}

impl EngineConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        sample_budget: usize,
        fallback_country: CountryCode,
        price_source_timeout: Duration,
        reference_currency: CurrencyCode,
    ) -> Self {
        Self {
            sample_budget,
            fallback_country,
            price_source_timeout,
            reference_currency,
        }
    }

    pub fn with_sample_budget(mut self, sample_budget: usize) -> Self {
        self.sample_budget = sample_budget;
        self
    }

    pub fn with_fallback_country(mut self, fallback_country: CountryCode) -> Self {
        self.fallback_country = fallback_country;
        self
    }

    pub fn with_price_source_timeout(mut self, timeout: Duration) -> Self {
        self.price_source_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_budget: 20,
            fallback_country: CountryCode::from_ascii(*b"DE"),
            price_source_timeout: Duration::from_secs(2),
            reference_currency: CurrencyCode::EUR,
        }
    }
}
