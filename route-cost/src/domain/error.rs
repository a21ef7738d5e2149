//! Domain error types.
//!
//! These errors represent caller-input validation failures. They are
//! distinct from pricing-data gaps, which degrade into estimates instead
//! of failing.

/// Input validation errors. Always surfaced to the caller, never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A route needs a start and an end
    #[error("route must have at least 2 points, found {found}")]
    TooFewPoints { found: usize },

    /// Latitude or longitude out of range or not finite
    #[error("invalid coordinate: lat {latitude}, lng {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Vehicle type not in the supported set
    #[error("unknown vehicle type: {0}")]
    UnknownVehicleType(String),

    /// Fuel type not in the supported set
    #[error("unknown fuel type: {0}")]
    UnknownFuelType(String),

    /// Consumption must be a positive finite number
    #[error("consumption must be positive, got {0}")]
    InvalidConsumption(f64),

    /// Malformed ISO-3166 alpha-2 code
    #[error("invalid country code {code:?}: {reason}")]
    InvalidCountryCode { code: String, reason: &'static str },

    /// Malformed ISO-4217 code
    #[error("invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),
}
