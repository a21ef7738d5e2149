//! Toll charge resolution.
//!
//! Tiers, strictly in order: stored road segments, the vignette table,
//! the flat per-km rate, and finally a zero "no data" quote.

use std::time::Duration;

use crate::cache::{CacheTier, CachedValue, Fingerprint, ResultCache};
use crate::domain::{CountryCode, GeoPoint, QuoteSource, TollChargeQuote, VehicleClass};

use super::fallback::{Tier, TierOutcome, bounded, first_success};
use super::source::{PriceSource, PriceSourceError, TollSegment};
use super::tables::PricingTables;

/// What a toll quote is being resolved for.
#[derive(Debug, Clone, Copy)]
pub struct TollQuery<'g> {
    pub geometry: &'g [GeoPoint],
    pub country: CountryCode,
    pub vehicle_class: VehicleClass,
    /// The country's share of the route length.
    pub distance_km: f64,
}

pub struct TollCostResolver<'a, P> {
    source: &'a P,
    tables: &'a PricingTables,
    cache: &'a ResultCache,
    timeout: Duration,
}

impl<'a, P: PriceSource> TollCostResolver<'a, P> {
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

    /// Resolve the toll charge for one country share. Never fails.
    pub async fn resolve(&self, query: TollQuery<'_>) -> TollChargeQuote {
        let key = Fingerprint::toll_charge(
            query.geometry,
            query.country,
            query.vehicle_class,
            query.distance_km,
        );
        if let Some(quote) = self.cache.toll(&key).await {
            return quote;
        }

        let tiers = vec![
            Tier::new("toll segments", async move {
                let segments = bounded(
                    self.timeout,
                    self.source
                        .toll_segments_intersecting(query.geometry, query.country),
                )
                .await;
                self.price_segments(query, segments)
            }),
            Tier::new("vignette", async move { self.vignette(query) }),
            Tier::new("flat rate", async move { self.flat_rate(query) }),
        ];

        let resolution = first_success(tiers).await;
        let degraded = resolution.as_ref().is_some_and(|r| r.degraded);
        let quote = match resolution {
            Some(resolution) => resolution.value,
            None => TollChargeQuote::none(query.country, self.tables.reference_currency()),
        };

        if !degraded {
            self.cache
                .set_in_tier(key, CachedValue::Toll(quote.clone()), CacheTier::PriceLookup)
                .await;
        }
        quote
    }

    fn price_segments(
        &self,
        query: TollQuery<'_>,
        segments: Result<Vec<TollSegment>, PriceSourceError>,
    ) -> TierOutcome<TollChargeQuote> {
        let segments = match segments {
            Ok(segments) => segments,
            Err(e) => return TierOutcome::Failed(e.to_string()),
        };

        let priced: Vec<_> = segments
            .iter()
            .filter(|segment| segment.country == query.country)
            .filter_map(|segment| {
                segment
                    .price_for(query.vehicle_class)
                    .map(|price| (segment, price))
            })
            .collect();
        if priced.is_empty() {
            return TierOutcome::NotApplicable;
        }

        let mut amount = 0.0;
        let mut unknown_currency = None;
        for (_, price) in &priced {
            let converted = self.tables.convert(price.amount, price.currency);
            amount += converted.amount;
            unknown_currency = unknown_currency.or(converted.unknown_currency);
        }
        let names: Vec<&str> = priced.iter().map(|(s, _)| s.name.as_str()).collect();

        TierOutcome::Found(TollChargeQuote {
            country: query.country,
            amount,
            currency: self.tables.reference_currency(),
            source: QuoteSource::Database,
            description: format!("toll segments: {}", names.join(", ")),
            unknown_currency,
        })
    }

    fn vignette(&self, query: TollQuery<'_>) -> TierOutcome<TollChargeQuote> {
        match self
            .tables
            .cheapest_vignette(query.country, query.vehicle_class)
        {
            Some((pass, converted)) => TierOutcome::Found(TollChargeQuote {
                country: query.country,
                amount: converted.amount,
                currency: self.tables.reference_currency(),
                source: QuoteSource::Vignette,
                description: format!(
                    "{} {} ({:.2} {})",
                    query.country, pass.name, pass.price, pass.currency
                ),
                unknown_currency: converted.unknown_currency,
            }),
            None => TierOutcome::NotApplicable,
        }
    }

    fn flat_rate(&self, query: TollQuery<'_>) -> TierOutcome<TollChargeQuote> {
        let Some(rate) = self.tables.toll_rate(query.country) else {
            return TierOutcome::NotApplicable;
        };
        let per_km = rate.per_km(query.vehicle_class);
        let currency = self.tables.reference_currency();
        let description = if per_km == 0.0 {
            format!("no distance toll for {} in {}", query.vehicle_class, query.country)
        } else {
            format!(
                "estimated {per_km:.3} {currency}/km over {:.1} km in {}",
                query.distance_km, query.country
            )
        };

        TierOutcome::Found(TollChargeQuote {
            country: query.country,
            amount: per_km * query.distance_km,
            currency,
            source: QuoteSource::Estimated,
            description,
            unknown_currency: None,
        })
    }
}
