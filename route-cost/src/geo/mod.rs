//! Country detection along a route.

mod classifier;
mod partition;

pub use classifier::{BoundingBox, CountryRule, EUROPEAN_RULES, GeoCountryClassifier, Refinement};
pub use partition::{RoutePartition, RoutePartitioner, sample_indices};
