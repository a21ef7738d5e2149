//! Geographic points, routes and per-country distance shares.

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

use super::country::CountryCode;
use super::error::ValidationError;

/// A WGS84 coordinate. Valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "lat")]
    latitude: f64,
    #[serde(rename = "lng")]
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(ValidationError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another point in kilometres.
    pub fn haversine_km(&self, other: &GeoPoint) -> f64 {
        let from = Point::new(self.longitude, self.latitude);
        let to = Point::new(other.longitude, other.latitude);
        from.haversine_distance(&to) / 1000.0
    }
}

impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lng: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        GeoPoint::new(raw.lat, raw.lng).map_err(serde::de::Error::custom)
    }
}

/// An ordered driving path from start to end.
///
/// Always has at least 2 points.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    /// Create a route from an ordered point sequence.
    pub fn new(points: Vec<GeoPoint>) -> Result<Self, ValidationError> {
        if points.len() < 2 {
            return Err(ValidationError::TooFewPoints {
                found: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Create a route from raw `(lat, lng)` pairs.
    pub fn from_coordinates(coords: &[(f64, f64)]) -> Result<Self, ValidationError> {
        let points = coords
            .iter()
            .map(|&(lat, lng)| GeoPoint::new(lat, lng))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(points)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total length as the sum of consecutive haversine distances.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].haversine_km(&pair[1]))
            .sum()
    }
}

/// The part of a route's length attributed to one country.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegmentShare {
    pub country: CountryCode,
    pub distance_km: f64,
}
