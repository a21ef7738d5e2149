//! Stored price data behind a capability interface.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::domain::{CountryCode, CurrencyCode, FuelType, GeoPoint, VehicleClass};

/// Error from a price source lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PriceSourceError {
    /// Lookup did not finish within the configured bound
    #[error("price source timed out")]
    Timeout,

    /// Backing store could not be reached
    #[error("price source unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be interpreted
    #[error("malformed price data: {0}")]
    Malformed(String),
}

/// Price of one toll segment for one vehicle class, in its own currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPrice {
    pub amount: f64,
    pub currency: CurrencyCode,
}

/// A stored, priced stretch of tolled road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TollSegment {
    pub name: String,
    pub country: CountryCode,
    pub entry: GeoPoint,
    pub exit: GeoPoint,
    /// Classes without an entry are not priced on this segment.
    pub prices: BTreeMap<VehicleClass, SegmentPrice>,
}

impl TollSegment {
    pub fn price_for(&self, class: VehicleClass) -> Option<SegmentPrice> {
        self.prices.get(&class).copied()
    }
}

/// Trait for looking up stored fuel prices and toll segments.
///
/// Implementations may do I/O. Callers bound each call with a timeout and
/// treat any error as "try the next tier".
pub trait PriceSource: Send + Sync {
    /// Stored price per litre (or kWh) in the reference currency.
    ///
    /// `Ok(None)` means the store has no record for this pair.
    fn fuel_price(
        &self,
        country: CountryCode,
        fuel: FuelType,
    ) -> impl Future<Output = Result<Option<f64>, PriceSourceError>> + Send;

    /// Segments in `country` that the route geometry passes through.
    fn toll_segments_intersecting(
        &self,
        geometry: &[GeoPoint],
        country: CountryCode,
    ) -> impl Future<Output = Result<Vec<TollSegment>, PriceSourceError>> + Send;
}
