//! Price resolution: where unit prices come from and how missing or
//! unreachable data degrades into estimates.

mod fallback;
mod fuel;
mod memory;
mod source;
mod tables;
mod toll;

pub use fallback::{Resolution, Tier, TierOutcome, bounded, first_success};
pub use fuel::{FuelCostResolver, FuelEstimate};
pub use memory::{DEFAULT_MATCH_RADIUS_KM, InMemoryPriceSource, distance_to_path_km};
pub use source::{PriceSource, PriceSourceError, SegmentPrice, TollSegment};
pub use tables::{Converted, FuelPrices, PricingTables, TollRate, VignettePass};
pub use toll::{TollCostResolver, TollQuery};
