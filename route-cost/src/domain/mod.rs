//! Domain types for route cost estimation.
//!
//! This module contains the validated value types that flow through the
//! pricing pipeline. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod country;
mod currency;
mod error;
mod quote;
mod route;
mod vehicle;

pub use country::CountryCode;
pub use currency::CurrencyCode;
pub use error::ValidationError;
pub use quote::{CostBreakdown, CountryCost, FuelPriceQuote, QuoteSource, TollChargeQuote};
pub use route::{GeoPoint, Route, RouteSegmentShare};
pub use vehicle::{FuelType, VehicleClass, VehicleProfile};
