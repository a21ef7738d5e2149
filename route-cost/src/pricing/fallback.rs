//! Ordered fallback chains.
//!
//! A chain is a list of tiers tried in order. Each tier either finds a
//! value, declares itself not applicable, or fails. The first tier that
//! finds a value wins; failures are logged and the chain moves on.
//! Later tiers are never started once an earlier one has succeeded.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::source::PriceSourceError;

/// Outcome of a single tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome<T> {
    Found(T),
    /// The tier has nothing to say for this input.
    NotApplicable,
    /// The tier could not be evaluated (I/O error, timeout).
    Failed(String),
}

impl<T> From<Result<Option<T>, PriceSourceError>> for TierOutcome<T> {
    fn from(result: Result<Option<T>, PriceSourceError>) -> Self {
        match result {
            Ok(Some(value)) => TierOutcome::Found(value),
            Ok(None) => TierOutcome::NotApplicable,
            Err(e) => TierOutcome::Failed(e.to_string()),
        }
    }
}

/// A named, not-yet-started attempt.
pub struct Tier<'a, T> {
    pub name: &'static str,
    attempt: BoxFuture<'a, TierOutcome<T>>,
}

impl<'a, T> Tier<'a, T> {
    pub fn new(
        name: &'static str,
        attempt: impl Future<Output = TierOutcome<T>> + Send + 'a,
    ) -> Self {
        Self {
            name,
            attempt: Box::pin(attempt),
        }
    }

    /// A tier whose answer is already known.
    pub fn ready(name: &'static str, outcome: TierOutcome<T>) -> Self
    where
        T: Send + 'a,
    {
        Self::new(name, async move { outcome })
    }
}

/// The winning value and how it was reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
    pub value: T,
    /// Name of the tier that produced the value.
    pub tier: &'static str,
    /// Some earlier tier failed rather than declining.
    pub degraded: bool,
}

/// Run tiers in order, returning the first found value.
///
/// `None` if every tier declined or failed.
pub async fn first_success<T>(tiers: Vec<Tier<'_, T>>) -> Option<Resolution<T>> {
    let mut degraded = false;
    for tier in tiers {
        match tier.attempt.await {
            TierOutcome::Found(value) => {
                return Some(Resolution {
                    value,
                    tier: tier.name,
                    degraded,
                });
            }
            TierOutcome::NotApplicable => {
                debug!(tier = tier.name, "tier not applicable, falling back");
            }
            TierOutcome::Failed(error) => {
                warn!(tier = tier.name, error = %error, "tier failed, falling back");
                degraded = true;
            }
        }
    }
    None
}

/// Bound a price source call by `limit`.
pub async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, PriceSourceError>>,
) -> Result<T, PriceSourceError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PriceSourceError::Timeout),
    }
}
