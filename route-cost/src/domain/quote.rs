//! Priced quotes and the aggregated cost breakdown.

use serde::Serialize;

use super::country::CountryCode;
use super::currency::CurrencyCode;
use super::vehicle::FuelType;

/// Provenance of a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteSource {
    /// Looked up in the price store
    Database,
    /// Flat vignette fee from the static table
    Vignette,
    /// Approximated from a static average
    Estimated,
    /// No data for this country at all
    None,
}

impl QuoteSource {
    /// Only a database lookup counts as precise.
    pub fn is_precise(&self) -> bool {
        matches!(self, QuoteSource::Database)
    }
}

/// Fuel price resolved for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelPriceQuote {
    pub country: CountryCode,
    pub fuel_type: FuelType,
    /// Reference-currency price per litre (or kWh).
    pub price_per_unit: f64,
    pub source: QuoteSource,
}

/// Toll charge resolved for one country.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TollChargeQuote {
    pub country: CountryCode,
    /// Amount in `currency`, already converted.
    pub amount: f64,
    pub currency: CurrencyCode,
    pub source: QuoteSource,
    /// Human-readable audit trail of how the amount was obtained.
    pub description: String,
    /// Set when an amount in this currency was converted at parity
    /// because no exchange rate was known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_currency: Option<CurrencyCode>,
}

impl TollChargeQuote {
    /// A zero charge for a country with no toll data.
    pub fn none(country: CountryCode, currency: CurrencyCode) -> Self {
        Self {
            country,
            amount: 0.0,
            currency,
            source: QuoteSource::None,
            description: format!("no toll data for {country}"),
            unknown_currency: None,
        }
    }
}

/// Fuel and toll detail for one country share of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCost {
    pub country: CountryCode,
    pub distance_km: f64,
    /// Litres (or kWh) consumed over the share.
    pub fuel_units: f64,
    pub fuel_cost: f64,
    pub fuel: FuelPriceQuote,
    pub toll: TollChargeQuote,
}

impl CountryCost {
    /// True if both quotes are database lookups.
    pub fn is_precise(&self) -> bool {
        self.fuel.source.is_precise() && self.toll.source.is_precise()
    }
}

/// Total priced result for a route.
///
/// Amounts are unrounded; rounding happens at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub fuel_cost: f64,
    pub toll_cost: f64,
    pub total_cost: f64,
    pub currency: CurrencyCode,
    pub distance_km: f64,
    /// Ordered as countries were first encountered along the route.
    pub per_country: Vec<CountryCost>,
    pub is_estimated: bool,
}

impl CostBreakdown {
    /// Sum per-country entries into a breakdown.
    ///
    /// `forced_estimate` marks results that are approximate for reasons
    /// outside the quotes themselves (e.g. no country was detected).
    pub fn from_countries(
        per_country: Vec<CountryCost>,
        currency: CurrencyCode,
        forced_estimate: bool,
    ) -> Self {
        let fuel_cost: f64 = per_country.iter().map(|c| c.fuel_cost).sum();
        let toll_cost: f64 = per_country.iter().map(|c| c.toll.amount).sum();
        let distance_km = per_country.iter().map(|c| c.distance_km).sum();
        let is_estimated = forced_estimate || per_country.iter().any(|c| !c.is_precise());

        Self {
            fuel_cost,
            toll_cost,
            total_cost: fuel_cost + toll_cost,
            currency,
            distance_km,
            per_country,
            is_estimated,
        }
    }
}
