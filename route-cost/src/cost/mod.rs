//! Route cost estimation.
//!
//! This module ties the pieces together: country detection, concurrent
//! per-country fuel and toll resolution, and summation into a single
//! breakdown with provenance.

mod aggregator;
mod config;
mod engine;
mod error;

pub use aggregator::CostAggregator;
pub use config::EngineConfig;
pub use engine::{CostEngine, TripCost};
pub use error::CostError;
