//! The pricing pipeline.
//!
//! route + vehicle → detect countries (cached) → split length per country
//! → price each share concurrently → breakdown.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheTier, CachedValue, Fingerprint, ResultCache};
use crate::domain::{CostBreakdown, CountryCode, Route, VehicleProfile};
use crate::geo::{GeoCountryClassifier, RoutePartition, RoutePartitioner};
use crate::pricing::{PriceSource, PricingTables};
use crate::route_provider::{RouteGeometry, RouteProvider, TripRequest};

use super::aggregator::CostAggregator;
use super::config::EngineConfig;
use super::error::CostError;

/// A priced trip fetched through a route provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCost {
    /// Provider-reported distance in metres.
    pub distance_m: f64,
    /// Provider-reported duration in seconds.
    pub duration_s: f64,
    pub breakdown: CostBreakdown,
}

/// Prices routes against a price source, static tables and a shared cache.
pub struct CostEngine<P> {
    source: P,
    tables: PricingTables,
    cache: Arc<ResultCache>,
    classifier: GeoCountryClassifier,
    partitioner: RoutePartitioner,
    config: EngineConfig,
}

impl<P: PriceSource> CostEngine<P> {
    /// Create an engine using the built-in European classification table.
    pub fn new(
        source: P,
        tables: PricingTables,
        cache: Arc<ResultCache>,
        config: EngineConfig,
    ) -> Self {
        Self::with_classifier(source, tables, cache, config, GeoCountryClassifier::european())
    }

    pub fn with_classifier(
        source: P,
        tables: PricingTables,
        cache: Arc<ResultCache>,
        config: EngineConfig,
        classifier: GeoCountryClassifier,
    ) -> Self {
        if tables.reference_currency() != config.reference_currency {
            warn!(
                tables = %tables.reference_currency(),
                config = %config.reference_currency,
                "pricing tables use a different reference currency"
            );
        }
        let partitioner =
            RoutePartitioner::new(classifier, config.sample_budget, config.fallback_country);

        Self {
            source,
            tables,
            cache,
            classifier,
            partitioner,
            config,
        }
    }

    pub fn classifier(&self) -> &GeoCountryClassifier {
        &self.classifier
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Countries along a route, in first-encountered order. Cached.
    pub async fn detect_countries(&self, route: &Route) -> Arc<Vec<CountryCode>> {
        let key = Fingerprint::countries(route.points(), self.config.sample_budget);
        if let Some(countries) = self.cache.countries(&key).await {
            return countries;
        }

        let countries = Arc::new(self.partitioner.detect_countries(route));
        self.cache
            .set_in_tier(
                key,
                CachedValue::Countries(countries.clone()),
                CacheTier::CountryDetection,
            )
            .await;
        countries
    }

    /// Per-country shares of a route.
    pub async fn partition(&self, route: &Route) -> RoutePartition {
        let countries = self.detect_countries(route).await;
        let partition = self.partitioner.split(route, &countries);
        if partition.fallback_used {
            debug!(
                fallback = %self.config.fallback_country,
                "no country detected, using fallback"
            );
        }
        partition
    }

    /// Price a route for a vehicle.
    ///
    /// Never fails: missing or unreachable price data degrades into
    /// estimates and sets `is_estimated`.
    pub async fn price_route(&self, route: &Route, vehicle: &VehicleProfile) -> CostBreakdown {
        let partition = self.partition(route).await;

        let aggregator = CostAggregator::new(
            &self.source,
            &self.tables,
            &self.cache,
            self.config.price_source_timeout,
            self.config.reference_currency,
        );
        let breakdown = aggregator
            .aggregate(
                route.points(),
                &partition.shares,
                vehicle,
                partition.fallback_used,
            )
            .await;

        info!(
            countries = breakdown.per_country.len(),
            distance_km = breakdown.distance_km,
            total = breakdown.total_cost,
            currency = %breakdown.currency,
            estimated = breakdown.is_estimated,
            "priced route"
        );
        breakdown
    }

    /// Price a route, giving up once `deadline` has elapsed.
    ///
    /// In-flight lookups are dropped on expiry; no breakdown is produced.
    pub async fn price_route_within(
        &self,
        route: &Route,
        vehicle: &VehicleProfile,
        deadline: Duration,
    ) -> Result<CostBreakdown, CostError> {
        tokio::time::timeout(deadline, self.price_route(route, vehicle))
            .await
            .map_err(|_| CostError::DeadlineElapsed(deadline))
    }

    /// Route geometry for a trip. Cached; provider failures propagate.
    pub async fn fetch_geometry<R: RouteProvider>(
        &self,
        provider: &R,
        request: &TripRequest,
    ) -> Result<Arc<RouteGeometry>, CostError> {
        let key = Fingerprint::route_geometry(request);
        if let Some(geometry) = self.cache.route(&key).await {
            return Ok(geometry);
        }

        let geometry = Arc::new(provider.fetch_route(request).await?);
        self.cache
            .set_in_tier(key, CachedValue::Route(geometry.clone()), CacheTier::RouteGeometry)
            .await;
        Ok(geometry)
    }

    /// Fetch a trip's geometry from a route provider, then price it.
    pub async fn price_trip<R: RouteProvider>(
        &self,
        provider: &R,
        request: &TripRequest,
        vehicle: &VehicleProfile,
    ) -> Result<TripCost, CostError> {
        let geometry = self.fetch_geometry(provider, request).await?;
        let breakdown = self.price_route(&geometry.route, vehicle).await;
        Ok(TripCost {
            distance_m: geometry.distance_m,
            duration_s: geometry.duration_s,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::domain::{FuelType, GeoPoint, QuoteSource, VehicleClass};
    use crate::pricing::{InMemoryPriceSource, PriceSourceError, TollSegment};
    use crate::route_provider::{RouteProviderError, StraightLineProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PARIS: (f64, f64) = (48.8566, 2.3522);
    const LYON: (f64, f64) = (45.7640, 4.8357);
    const VILNIUS: (f64, f64) = (54.6872, 25.2797);
    const KAUNAS: (f64, f64) = (54.8978, 23.9094);

    const FR_FIXTURE: &str = r#"{
        "fuelPrices": [{"country": "FR", "fuelType": "petrol_95", "price": 1.879}],
        "tollSegments": [{
            "name": "A6 Paris - Lyon",
            "country": "FR",
            "entry": {"lat": 48.80, "lng": 2.40},
            "exit": {"lat": 45.80, "lng": 4.80},
            "prices": {
                "car": {"amount": 38.5, "currency": "EUR"},
                "truck": {"amount": 112.0, "currency": "EUR"}
            }
        }]
    }"#;

    fn engine<P: PriceSource>(source: P) -> CostEngine<P> {
        CostEngine::new(
            source,
            PricingTables::european(),
            Arc::new(ResultCache::new(&CacheConfig::default())),
            EngineConfig::default(),
        )
    }

    fn route(points: &[(f64, f64)]) -> Route {
        Route::from_coordinates(points).unwrap()
    }

    fn car() -> VehicleProfile {
        VehicleProfile::for_class(VehicleClass::Car)
    }

    /// Price source that takes too long, counting calls.
    struct SlowSource {
        delay: Duration,
        calls: AtomicUsize,
    }

    impl PriceSource for SlowSource {
        async fn fuel_price(
            &self,
            _country: CountryCode,
            _fuel: FuelType,
        ) -> Result<Option<f64>, PriceSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Some(9.99))
        }

        async fn toll_segments_intersecting(
            &self,
            _geometry: &[GeoPoint],
            _country: CountryCode,
        ) -> Result<Vec<TollSegment>, PriceSourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }
    }

    /// Route provider that counts calls and optionally fails.
    struct CountingProvider {
        inner: StraightLineProvider,
        fail: bool,
        calls: AtomicUsize,
    }

    impl CountingProvider {
        fn new(fail: bool) -> Self {
            Self {
                inner: StraightLineProvider::default(),
                fail,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RouteProvider for CountingProvider {
        async fn fetch_route(
            &self,
            request: &TripRequest,
        ) -> Result<RouteGeometry, RouteProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RouteProviderError::Unavailable("503 from upstream".into()));
            }
            self.inner.fetch_route(request).await
        }
    }

    #[tokio::test]
    async fn vilnius_to_kaunas_is_toll_free_estimate() {
        let engine = engine(InMemoryPriceSource::new());
        let breakdown = engine.price_route(&route(&[VILNIUS, KAUNAS]), &car()).await;

        assert_eq!(breakdown.per_country.len(), 1);
        assert_eq!(breakdown.per_country[0].country.as_str(), "LT");
        assert_eq!(breakdown.toll_cost, 0.0);
        assert!(matches!(
            breakdown.per_country[0].toll.source,
            QuoteSource::Estimated | QuoteSource::None
        ));
        assert!(breakdown.is_estimated);
        assert_eq!(breakdown.total_cost, breakdown.fuel_cost + breakdown.toll_cost);
    }

    #[tokio::test]
    async fn paris_to_lyon_with_segment_fixture() {
        let engine = engine(InMemoryPriceSource::from_json(FR_FIXTURE).unwrap());
        let paris_lyon = route(&[PARIS, LYON]);
        let km = paris_lyon.length_km();

        let breakdown = engine.price_route(&paris_lyon, &car()).await;
        let fr = &breakdown.per_country[0];

        assert_eq!(breakdown.per_country.len(), 1);
        assert_eq!(fr.country.as_str(), "FR");
        assert_eq!(fr.fuel.source, QuoteSource::Database);
        assert_eq!(fr.fuel.price_per_unit, 1.879);
        assert_eq!(breakdown.fuel_cost, km / 100.0 * 7.0 * 1.879);
        assert_eq!(fr.toll.source, QuoteSource::Database);
        assert_eq!(breakdown.toll_cost, 38.5);
        assert!(!breakdown.is_estimated);
    }

    #[tokio::test]
    async fn paris_to_lyon_without_segments_uses_flat_rate() {
        let engine = engine(InMemoryPriceSource::new());
        let paris_lyon = route(&[PARIS, LYON]);
        let km = paris_lyon.length_km();

        let breakdown = engine.price_route(&paris_lyon, &car()).await;

        assert_eq!(breakdown.per_country[0].toll.source, QuoteSource::Estimated);
        assert!((breakdown.toll_cost - 0.09 * km).abs() < 1e-9);
        assert_eq!(breakdown.fuel_cost, km / 100.0 * 7.0 * 1.85);
        assert!(breakdown.is_estimated);
    }

    #[tokio::test]
    async fn repeated_pricing_is_byte_identical() {
        let engine = engine(InMemoryPriceSource::from_json(FR_FIXTURE).unwrap());
        let trip = route(&[PARIS, (47.32, 5.04), LYON]);

        let first = serde_json::to_string(&engine.price_route(&trip, &car()).await).unwrap();
        let second = serde_json::to_string(&engine.price_route(&trip, &car()).await).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unclassified_route_uses_fallback_and_is_estimated() {
        let source = InMemoryPriceSource::new();
        source
            .insert_fuel_price(CountryCode::parse("DE").unwrap(), FuelType::Petrol95, 1.80)
            .await;
        let engine = engine(source);

        let breakdown = engine
            .price_route(&route(&[(40.0, -40.0), (41.0, -39.0)]), &car())
            .await;

        assert_eq!(breakdown.per_country.len(), 1);
        assert_eq!(breakdown.per_country[0].country.as_str(), "DE");
        assert_eq!(breakdown.per_country[0].fuel.source, QuoteSource::Database);
        assert!(breakdown.is_estimated);
    }

    #[tokio::test]
    async fn cross_border_shares_follow_route_order() {
        let engine = engine(InMemoryPriceSource::new());
        // Strasbourg -> Karlsruhe -> Stuttgart
        let trip = route(&[(48.57, 7.75), (49.01, 8.40), (48.78, 9.18)]);

        let breakdown = engine.price_route(&trip, &car()).await;
        let order: Vec<_> = breakdown.per_country.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(order, vec!["FR", "DE"]);
        assert!((breakdown.distance_km - trip.length_km()).abs() < 1e-9);
    }

    #[tokio::test]
    async fn slow_price_source_degrades_to_estimates() {
        let source = SlowSource {
            delay: Duration::from_secs(5),
            calls: AtomicUsize::new(0),
        };
        let engine = CostEngine::new(
            source,
            PricingTables::european(),
            Arc::new(ResultCache::new(&CacheConfig::default())),
            EngineConfig::default().with_price_source_timeout(Duration::from_millis(20)),
        );

        let breakdown = engine.price_route(&route(&[PARIS, LYON]), &car()).await;
        assert_eq!(breakdown.per_country[0].fuel.price_per_unit, 1.85);
        assert!(breakdown.is_estimated);
    }

    #[tokio::test]
    async fn deadline_elapsed_is_an_error() {
        let source = SlowSource {
            delay: Duration::from_secs(5),
            calls: AtomicUsize::new(0),
        };
        let engine = engine(source);

        let result = engine
            .price_route_within(&route(&[PARIS, LYON]), &car(), Duration::from_millis(20))
            .await;
        assert_eq!(result, Err(CostError::DeadlineElapsed(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn deadline_not_reached_returns_breakdown() {
        let engine = engine(InMemoryPriceSource::new());
        let result = engine
            .price_route_within(&route(&[VILNIUS, KAUNAS]), &car(), Duration::from_secs(5))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn country_detection_is_cached() {
        let engine = engine(InMemoryPriceSource::new());
        let trip = route(&[VILNIUS, KAUNAS]);

        let first = engine.detect_countries(&trip).await;
        let second = engine.detect_countries(&trip).await;
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn trip_geometry_is_cached() {
        let engine = engine(InMemoryPriceSource::new());
        let provider = CountingProvider::new(false);
        let request = TripRequest::new(
            GeoPoint::new(VILNIUS.0, VILNIUS.1).unwrap(),
            GeoPoint::new(KAUNAS.0, KAUNAS.1).unwrap(),
        );

        let first = engine.price_trip(&provider, &request, &car()).await.unwrap();
        let second = engine.price_trip(&provider, &request, &car()).await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(first.distance_m > 88_000.0 && first.distance_m < 96_000.0);
        assert_eq!(first.breakdown.per_country[0].country.as_str(), "LT");
    }

    #[tokio::test]
    async fn route_provider_failure_is_fatal() {
        let engine = engine(InMemoryPriceSource::new());
        let provider = CountingProvider::new(true);
        let request = TripRequest::new(
            GeoPoint::new(PARIS.0, PARIS.1).unwrap(),
            GeoPoint::new(LYON.0, LYON.1).unwrap(),
        );

        let result = engine.price_trip(&provider, &request, &car()).await;
        assert!(matches!(result, Err(CostError::RouteProvider(_))));

        // Failures are not cached
        let _ = engine.price_trip(&provider, &request, &car()).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_all_forces_fresh_lookups() {
        let source = InMemoryPriceSource::new();
        let engine = engine(source);
        let trip = route(&[PARIS, LYON]);
        let fr = CountryCode::parse("FR").unwrap();

        let before = engine.price_route(&trip, &car()).await;
        assert_eq!(before.per_country[0].fuel.source, QuoteSource::Estimated);

        engine.source().insert_fuel_price(fr, FuelType::Petrol95, 1.5).await;
        // Still served from cache
        let cached = engine.price_route(&trip, &car()).await;
        assert_eq!(cached.per_country[0].fuel.source, QuoteSource::Estimated);

        engine.cache().invalidate_all();
        let fresh = engine.price_route(&trip, &car()).await;
        assert_eq!(fresh.per_country[0].fuel.source, QuoteSource::Database);
        assert_eq!(fresh.per_country[0].fuel.price_per_unit, 1.5);
    }

    #[tokio::test]
    async fn truck_pays_segment_price_for_its_class() {
        let engine = engine(InMemoryPriceSource::from_json(FR_FIXTURE).unwrap());
        let truck = VehicleProfile::for_class(VehicleClass::Truck);

        let breakdown = engine.price_route(&route(&[PARIS, LYON]), &truck).await;
        assert_eq!(breakdown.toll_cost, 112.0);
        // Diesel has no stored price
        assert_eq!(breakdown.per_country[0].fuel.source, QuoteSource::Estimated);
    }
}
