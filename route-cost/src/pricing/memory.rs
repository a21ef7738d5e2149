//! In-memory price store.
//!
//! Loads fuel prices and toll segments from a JSON document and serves
//! them through [`PriceSource`]. Useful for development, fixtures and
//! deployments without a database.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use geo::{Closest, HaversineClosestPoint, HaversineDistance, LineString, Point};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::{CountryCode, FuelType, GeoPoint};

use super::source::{PriceSource, PriceSourceError, TollSegment};

/// Default distance within which a segment end counts as on the route.
pub const DEFAULT_MATCH_RADIUS_KM: f64 = 10.0;

/// One stored fuel price.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FuelPriceRecord {
    country: CountryCode,
    fuel_type: FuelType,
    price: f64,
}

/// On-disk layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceDocument {
    #[serde(default)]
    fuel_prices: Vec<FuelPriceRecord>,
    #[serde(default)]
    toll_segments: Vec<TollSegment>,
    match_radius_km: Option<f64>,
}

#[derive(Debug, Clone, Default)]
struct PriceData {
    fuel: HashMap<(CountryCode, FuelType), f64>,
    segments: Vec<TollSegment>,
}

/// Price source backed by in-process maps.
#[derive(Clone)]
pub struct InMemoryPriceSource {
    data: Arc<RwLock<PriceData>>,
    match_radius_km: f64,
}

impl Default for InMemoryPriceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPriceSource {
    /// An empty store. Every lookup misses.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(PriceData::default())),
            match_radius_km: DEFAULT_MATCH_RADIUS_KM,
        }
    }

    /// Load a store from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, PriceSourceError> {
        let document: PriceDocument = serde_json::from_str(json)
            .map_err(|e| PriceSourceError::Malformed(format!("failed to parse price data: {e}")))?;

        let mut fuel = HashMap::new();
        for record in document.fuel_prices {
            if !record.price.is_finite() || record.price < 0.0 {
                return Err(PriceSourceError::Malformed(format!(
                    "invalid {} price for {}: {}",
                    record.fuel_type, record.country, record.price
                )));
            }
            fuel.insert((record.country, record.fuel_type), record.price);
        }

        Ok(Self {
            data: Arc::new(RwLock::new(PriceData {
                fuel,
                segments: document.toll_segments,
            })),
            match_radius_km: document
                .match_radius_km
                .unwrap_or(DEFAULT_MATCH_RADIUS_KM),
        })
    }

    /// Load a store from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PriceSourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PriceSourceError::Unavailable(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn with_match_radius_km(mut self, radius_km: f64) -> Self {
        self.match_radius_km = radius_km;
        self
    }

    pub async fn insert_fuel_price(&self, country: CountryCode, fuel: FuelType, price: f64) {
        self.data.write().await.fuel.insert((country, fuel), price);
    }

    pub async fn insert_segment(&self, segment: TollSegment) {
        self.data.write().await.segments.push(segment);
    }

    /// Replace the contents with a freshly loaded file.
    pub async fn reload(&self, path: impl AsRef<Path>) -> Result<(), PriceSourceError> {
        let fresh = Self::from_file(path)?;
        let fresh = fresh.data.read().await.clone();
        *self.data.write().await = fresh;
        Ok(())
    }

    /// Number of stored fuel prices and toll segments.
    pub async fn counts(&self) -> (usize, usize) {
        let data = self.data.read().await;
        (data.fuel.len(), data.segments.len())
    }

    fn touches(&self, path: &[GeoPoint], point: &GeoPoint) -> bool {
        distance_to_path_km(point, path) <= self.match_radius_km
    }
}

/// Great-circle distance from a point to the nearest part of a path.
pub fn distance_to_path_km(point: &GeoPoint, path: &[GeoPoint]) -> f64 {
    let target = Point::new(point.longitude(), point.latitude());
    match path {
        [] => f64::INFINITY,
        [only] => point.haversine_km(only),
        _ => {
            let line: LineString<f64> = path
                .iter()
                .map(|p| (p.longitude(), p.latitude()))
                .collect();
            match line.haversine_closest_point(&target) {
                Closest::Intersection(nearest) | Closest::SinglePoint(nearest) => {
                    nearest.haversine_distance(&target) / 1000.0
                }
                Closest::Indeterminate => path
                    .iter()
                    .map(|p| point.haversine_km(p))
                    .fold(f64::INFINITY, f64::min),
            }
        }
    }
}

impl PriceSource for InMemoryPriceSource {
    async fn fuel_price(
        &self,
        country: CountryCode,
        fuel: FuelType,
    ) -> Result<Option<f64>, PriceSourceError> {
        Ok(self.data.read().await.fuel.get(&(country, fuel)).copied())
    }

    async fn toll_segments_intersecting(
        &self,
        geometry: &[GeoPoint],
        country: CountryCode,
    ) -> Result<Vec<TollSegment>, PriceSourceError> {
        let data = self.data.read().await;
        Ok(data
            .segments
            .iter()
            .filter(|s| s.country == country)
            .filter(|s| self.touches(geometry, &s.entry) && self.touches(geometry, &s.exit))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VehicleClass;
    use std::io::Write;

    const FIXTURE: &str = r#"{
        "fuelPrices": [
            {"country": "FR", "fuelType": "diesel", "price": 1.689},
            {"country": "FR", "fuelType": "petrol_95", "price": 1.879}
        ],
        "tollSegments": [
            {
                "name": "A6 Paris - Lyon",
                "country": "FR",
                "entry": {"lat": 48.80, "lng": 2.40},
                "exit": {"lat": 45.80, "lng": 4.80},
                "prices": {"car": {"amount": 38.5, "currency": "EUR"}}
            },
            {
                "name": "A8 Aix - Nice",
                "country": "FR",
                "entry": {"lat": 43.53, "lng": 5.45},
                "exit": {"lat": 43.70, "lng": 7.26},
                "prices": {"car": {"amount": 25.0, "currency": "EUR"}}
            }
        ]
    }"#;

    fn country(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[tokio::test]
    async fn load_from_json() {
        let source = InMemoryPriceSource::from_json(FIXTURE).unwrap();
        assert_eq!(source.counts().await, (2, 2));
        assert_eq!(
            source.fuel_price(country("FR"), FuelType::Diesel).await,
            Ok(Some(1.689))
        );
        assert_eq!(source.fuel_price(country("FR"), FuelType::Lpg).await, Ok(None));
        assert_eq!(source.fuel_price(country("DE"), FuelType::Diesel).await, Ok(None));
    }

    #[tokio::test]
    async fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let source = InMemoryPriceSource::from_file(file.path()).unwrap();
        assert_eq!(source.counts().await, (2, 2));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let result = InMemoryPriceSource::from_file("/nonexistent/prices.json");
        assert!(matches!(result, Err(PriceSourceError::Unavailable(_))));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = InMemoryPriceSource::from_json("{\"fuelPrices\": [{\"country\": \"fr\"}]}");
        assert!(matches!(result, Err(PriceSourceError::Malformed(_))));

        let negative =
            r#"{"fuelPrices": [{"country": "FR", "fuelType": "diesel", "price": -1.0}]}"#;
        assert!(matches!(
            InMemoryPriceSource::from_json(negative),
            Err(PriceSourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn segments_matched_by_route_proximity() {
        let source = InMemoryPriceSource::from_json(FIXTURE).unwrap();
        let paris_lyon = [point(48.8566, 2.3522), point(45.7640, 4.8357)];

        let segments = source
            .toll_segments_intersecting(&paris_lyon, country("FR"))
            .await
            .unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].name, "A6 Paris - Lyon");
        assert_eq!(segments[0].price_for(VehicleClass::Car).unwrap().amount, 38.5);
    }

    #[tokio::test]
    async fn segments_filtered_by_country() {
        let source = InMemoryPriceSource::from_json(FIXTURE).unwrap();
        let paris_lyon = [point(48.8566, 2.3522), point(45.7640, 4.8357)];

        let segments = source
            .toll_segments_intersecting(&paris_lyon, country("IT"))
            .await
            .unwrap();
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn one_end_near_route_is_not_enough() {
        let source = InMemoryPriceSource::from_json(FIXTURE).unwrap();
        // Paris towards Orléans only reaches the A6 entry
        let partial = [point(48.8566, 2.3522), point(47.90, 1.90)];

        let segments = source
            .toll_segments_intersecting(&partial, country("FR"))
            .await
            .unwrap();
        assert!(segments.is_empty());
    }

    #[tokio::test]
    async fn inserts_are_visible() {
        let source = InMemoryPriceSource::new();
        source
            .insert_fuel_price(country("LT"), FuelType::Diesel, 1.49)
            .await;
        assert_eq!(
            source.fuel_price(country("LT"), FuelType::Diesel).await,
            Ok(Some(1.49))
        );
    }

    #[tokio::test]
    async fn match_radius_bounds_inserted_segments() {
        let segment = TollSegment {
            name: "A6 north of Paris".into(),
            country: country("FR"),
            // About 2.2 km north of the route start
            entry: point(48.8766, 2.3522),
            exit: point(45.7640, 4.8357),
            prices: [(
                VehicleClass::Car,
                crate::pricing::SegmentPrice {
                    amount: 30.0,
                    currency: crate::domain::CurrencyCode::EUR,
                },
            )]
            .into_iter()
            .collect(),
        };
        let paris_lyon = [point(48.8566, 2.3522), point(45.7640, 4.8357)];

        let wide = InMemoryPriceSource::new();
        wide.insert_segment(segment.clone()).await;
        assert_eq!(wide.counts().await, (0, 1));
        let found = wide
            .toll_segments_intersecting(&paris_lyon, country("FR"))
            .await
            .unwrap();
        assert_eq!(found, vec![segment.clone()]);

        let narrow = InMemoryPriceSource::new().with_match_radius_km(1.0);
        narrow.insert_segment(segment).await;
        let found = narrow
            .toll_segments_intersecting(&paris_lyon, country("FR"))
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn reload_replaces_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let source = InMemoryPriceSource::new();
        assert_eq!(source.counts().await, (0, 0));
        source.reload(file.path()).await.unwrap();
        assert_eq!(source.counts().await, (2, 2));
    }

    #[test]
    fn distance_to_path_uses_nearest_leg() {
        let path = [point(48.8566, 2.3522), point(45.7640, 4.8357)];
        // Midpoint of the straight line is on the path
        let on_path = point(47.31, 3.59);
        assert!(distance_to_path_km(&on_path, &path) < 5.0);

        let far = point(43.30, 5.37);
        assert!(distance_to_path_km(&far, &path) > 200.0);

        assert_eq!(distance_to_path_km(&far, &[]), f64::INFINITY);
    }
}
