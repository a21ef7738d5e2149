//! Fuel price resolution.

use std::time::Duration;

use crate::cache::{CacheTier, CachedValue, Fingerprint, ResultCache};
use crate::domain::{CountryCode, FuelPriceQuote, FuelType, QuoteSource, VehicleProfile};

use super::fallback::{Tier, TierOutcome, bounded, first_success};
use super::source::PriceSource;
use super::tables::PricingTables;

/// Fuel used and paid for over one country share.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelEstimate {
    pub quote: FuelPriceQuote,
    /// Litres (or kWh).
    pub units: f64,
    pub cost: f64,
}

/// Resolves fuel prices: stored price, then country default, then the
/// regional average. Never fails.
pub struct FuelCostResolver<'a, P> {
    source: &'a P,
    tables: &'a PricingTables,
    cache: &'a ResultCache,
    timeout: Duration,
}

impl<'a, P: PriceSource> FuelCostResolver<'a, P> {
    pub fn new(
        source: &'a P,
        tables: &'a PricingTables,
        cache: &'a ResultCache,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            tables,
            cache,
            timeout,
        }
    }

    /// Price per unit for a fuel in a country.
    pub async fn resolve_price(&self, country: CountryCode, fuel: FuelType) -> FuelPriceQuote {
        let key = Fingerprint::fuel_price(country, fuel);
        if let Some(quote) = self.cache.fuel(&key).await {
            return quote;
        }

        let tiers = vec![
            Tier::new("stored fuel price", async move {
                let stored = bounded(self.timeout, self.source.fuel_price(country, fuel)).await;
                TierOutcome::from(stored.map(|price| {
                    price
                        .filter(|p| p.is_finite() && *p >= 0.0)
                        .map(|p| (p, QuoteSource::Database))
                }))
            }),
            Tier::new("country default", async move {
                match self.tables.fuel_default(country, fuel) {
                    Some(price) => TierOutcome::Found((price, QuoteSource::Estimated)),
                    None => TierOutcome::NotApplicable,
                }
            }),
            Tier::ready(
                "regional average",
                TierOutcome::Found((self.tables.regional_fuel_average(fuel), QuoteSource::Estimated)),
            ),
        ];

        let (price_per_unit, source, degraded) = match first_success(tiers).await {
            Some(resolution) => (resolution.value.0, resolution.value.1, resolution.degraded),
            None => (self.tables.regional_fuel_average(fuel), QuoteSource::Estimated, true),
        };

        let quote = FuelPriceQuote {
            country,
            fuel_type: fuel,
            price_per_unit,
            source,
        };

        if !degraded {
            self.cache
                .set_in_tier(key, CachedValue::Fuel(quote.clone()), CacheTier::PriceLookup)
                .await;
        }
        quote
    }

    /// Fuel consumed and its cost over `distance_km` in `country`.
    pub async fn resolve(
        &self,
        country: CountryCode,
        distance_km: f64,
        vehicle: &VehicleProfile,
    ) -> FuelEstimate {
        let quote = self.resolve_price(country, vehicle.fuel_type()).await;
        let units = distance_km / 100.0 * vehicle.consumption();
        FuelEstimate {
            cost: units * quote.price_per_unit,
            units,
            quote,
        }
    }
}
