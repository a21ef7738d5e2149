//! Caching layer for route geometry, country detection and price lookups.
//!
//! Entries are keyed by a [`Fingerprint`]: a SHA-256 digest of the
//! canonicalised inputs that determine the value. Each entry carries its
//! own TTL, chosen from the tier it belongs to, so a single moka cache
//! serves all three tiers. Expired entries read as absent. Writing the
//! same key again overwrites it.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache as MokaCache;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::{
    CountryCode, FuelPriceQuote, FuelType, GeoPoint, TollChargeQuote, VehicleClass,
};
use crate::route_provider::{RouteGeometry, TripRequest};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for route provider responses.
    pub route_ttl: Duration,

    /// TTL for detected country lists.
    pub country_ttl: Duration,

    /// TTL for resolved fuel and toll quotes.
    pub price_ttl: Duration,

    /// Maximum number of cached entries across all tiers.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            route_ttl: Duration::from_secs(24 * 60 * 60),
            country_ttl: Duration::from_secs(24 * 60 * 60),
            price_ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn with_route_ttl(mut self, ttl: Duration) -> Self {
        self.route_ttl = ttl;
        self
    }

    pub fn with_country_ttl(mut self, ttl: Duration) -> Self {
        self.country_ttl = ttl;
        self
    }

    pub fn with_price_ttl(mut self, ttl: Duration) -> Self {
        self.price_ttl = ttl;
        self
    }

    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// TTL for a tier.
    pub fn ttl_for(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::RouteGeometry => self.route_ttl,
            CacheTier::CountryDetection => self.country_ttl,
            CacheTier::PriceLookup => self.price_ttl,
        }
    }
}

/// Expiration tier of a cached value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    RouteGeometry,
    CountryDetection,
    PriceLookup,
}

/// Deterministic cache key.
///
/// Formatted as `kind:hexdigest` so keys of different kinds never collide
/// and remain readable in logs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(Arc<str>);

impl Fingerprint {
    fn digest(kind: &str, canonical: &str) -> Self {
        let hash = Sha256::digest(canonical.as_bytes());
        Self(format!("{kind}:{}", hex::encode(hash)).into())
    }

    /// Key for a route provider request.
    pub fn route_geometry(request: &TripRequest) -> Self {
        let mut canonical = String::new();
        push_point(&mut canonical, &request.origin);
        for waypoint in &request.waypoints {
            push_point(&mut canonical, waypoint);
        }
        push_point(&mut canonical, &request.destination);
        Self::digest("route", &canonical)
    }

    /// Key for the countries detected along a point sequence.
    ///
    /// The sample budget changes which points are looked at, so it is
    /// part of the key.
    pub fn countries(points: &[GeoPoint], sample_budget: usize) -> Self {
        let mut canonical = format!("{sample_budget}|");
        for point in points {
            push_point(&mut canonical, point);
        }
        Self::digest("countries", &canonical)
    }

    /// Key for a resolved fuel price.
    pub fn fuel_price(country: CountryCode, fuel: FuelType) -> Self {
        Self::digest("fuel", &format!("{country}|{fuel}"))
    }

    /// Key for a resolved toll charge on one country share.
    pub fn toll_charge(
        points: &[GeoPoint],
        country: CountryCode,
        class: VehicleClass,
        distance_km: f64,
    ) -> Self {
        let mut canonical = format!("{country}|{class}|{distance_km:.6}|");
        for point in points {
            push_point(&mut canonical, point);
        }
        Self::digest("toll", &canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_point(buf: &mut String, point: &GeoPoint) {
    use std::fmt::Write;
    // Writing to a String cannot fail.
    let _ = write!(buf, "{:.6},{:.6};", point.latitude(), point.longitude());
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached value of any tier.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    Route(Arc<RouteGeometry>),
    Countries(Arc<Vec<CountryCode>>),
    Fuel(FuelPriceQuote),
    Toll(TollChargeQuote),
}

/// Stored value with the TTL it was written with.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CachedValue,
    pub ttl: Duration,
}

/// Per-entry expiry: every write restarts the entry's own TTL.
struct EntryExpiry;

impl Expiry<Fingerprint, CacheEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &Fingerprint,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &Fingerprint,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Process-wide memo of expensive lookups.
pub struct ResultCache {
    entries: MokaCache<Fingerprint, CacheEntry>,
    config: CacheConfig,
}

impl ResultCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(EntryExpiry)
            .build();

        Self {
            entries,
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a live entry.
    pub async fn get(&self, key: &Fingerprint) -> Option<CachedValue> {
        let hit = self.entries.get(key).await.map(|entry| entry.value);
        if hit.is_some() {
            debug!(key = %key, "cache hit");
        }
        hit
    }

    /// Store a value with an explicit TTL.
    pub async fn set(&self, key: Fingerprint, value: CachedValue, ttl: Duration) {
        self.entries.insert(key, CacheEntry { value, ttl }).await;
    }

    /// Store a value with its tier's configured TTL.
    pub async fn set_in_tier(&self, key: Fingerprint, value: CachedValue, tier: CacheTier) {
        self.set(key, value, self.config.ttl_for(tier)).await;
    }

    /// Cached route provider response.
    pub async fn route(&self, key: &Fingerprint) -> Option<Arc<RouteGeometry>> {
        match self.get(key).await? {
            CachedValue::Route(geometry) => Some(geometry),
            _ => None,
        }
    }

    /// Cached country list.
    pub async fn countries(&self, key: &Fingerprint) -> Option<Arc<Vec<CountryCode>>> {
        match self.get(key).await? {
            CachedValue::Countries(countries) => Some(countries),
            _ => None,
        }
    }

    /// Cached fuel quote.
    pub async fn fuel(&self, key: &Fingerprint) -> Option<FuelPriceQuote> {
        match self.get(key).await? {
            CachedValue::Fuel(quote) => Some(quote),
            _ => None,
        }
    }

    /// Cached toll quote.
    pub async fn toll(&self, key: &Fingerprint) -> Option<TollChargeQuote> {
        match self.get(key).await? {
            CachedValue::Toll(quote) => Some(quote),
            _ => None,
        }
    }

    /// Get cache statistics (for monitoring).
    ///
    /// Approximate until pending maintenance has run.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Flush pending maintenance so `entry_count` is accurate.
    pub async fn sync(&self) {
        self.entries.run_pending_tasks().await;
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }
}
