//! Fan-out over country shares and fan-in into one breakdown.

use std::time::Duration;

use futures::future::join_all;

use crate::cache::ResultCache;
use crate::domain::{
    CostBreakdown, CountryCost, CurrencyCode, GeoPoint, RouteSegmentShare, VehicleProfile,
};
use crate::pricing::{FuelCostResolver, PriceSource, PricingTables, TollCostResolver, TollQuery};

/// Prices every country share concurrently and sums the results.
pub struct CostAggregator<'a, P> {
    fuel: FuelCostResolver<'a, P>,
    toll: TollCostResolver<'a, P>,
    currency: CurrencyCode,
}

impl<'a, P: PriceSource> CostAggregator<'a, P> {
    pub fn new(
        source: &'a P,
        tables: &'a PricingTables,
        cache: &'a ResultCache,
        timeout: Duration,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            fuel: FuelCostResolver::new(source, tables, cache, timeout),
            toll: TollCostResolver::new(source, tables, cache, timeout),
            currency,
        }
    }

    /// Price one country share: fuel and toll resolved concurrently.
    pub async fn price_share(
        &self,
        geometry: &[GeoPoint],
        share: RouteSegmentShare,
        vehicle: &VehicleProfile,
    ) -> CountryCost {
        let (fuel, toll) = futures::join!(
            self.fuel.resolve(share.country, share.distance_km, vehicle),
            self.toll.resolve(TollQuery {
                geometry,
                country: share.country,
                vehicle_class: vehicle.vehicle_class(),
                distance_km: share.distance_km,
            })
        );

        CountryCost {
            country: share.country,
            distance_km: share.distance_km,
            fuel_units: fuel.units,
            fuel_cost: fuel.cost,
            fuel: fuel.quote,
            toll,
        }
    }

    /// Price all shares and sum them, keeping share order.
    ///
    /// `forced_estimate` flags the result as estimated regardless of quote
    /// provenance.
    pub async fn aggregate(
        &self,
        geometry: &[GeoPoint],
        shares: &[RouteSegmentShare],
        vehicle: &VehicleProfile,
        forced_estimate: bool,
    ) -> CostBreakdown {
        let per_country = join_all(
            shares
                .iter()
                .map(|share| self.price_share(geometry, *share, vehicle)),
        )
        .await;

        CostBreakdown::from_countries(per_country, self.currency, forced_estimate)
    }
}
