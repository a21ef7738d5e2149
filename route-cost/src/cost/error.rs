//! Request-level failures of the cost pipeline.

use std::time::Duration;

use crate::domain::ValidationError;
use crate::route_provider::RouteProviderError;

/// Error from pricing a route or trip.
///
/// Degraded pricing is not an error: it is a successful breakdown with
/// `is_estimated` set.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CostError {
    /// Request was rejected before any work was done
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Route geometry could not be obtained
    #[error(transparent)]
    RouteProvider(#[from] RouteProviderError),

    /// Caller deadline elapsed before pricing finished
    #[error("pricing did not finish within {0:?}")]
    DeadlineElapsed(Duration),
}
