//! External routing collaborator.
//!
//! A route provider turns an origin, destination and optional waypoints
//! into a drivable point sequence. Any failure is fatal for the request
//! that needed it.

use std::future::Future;

use serde::Serialize;

use crate::domain::{GeoPoint, Route};

/// Error from a route provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteProviderError {
    /// Provider could not be reached or answered with an error
    #[error("route provider unavailable: {0}")]
    Unavailable(String),

    /// No drivable route between the requested points
    #[error("no route found between the requested points")]
    NoRoute,

    /// Provider answered with something unusable
    #[error("invalid route provider response: {0}")]
    InvalidResponse(String),
}

/// What to route between.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
}

impl TripRequest {
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
        }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<GeoPoint>) -> Self {
        self.waypoints = waypoints;
        self
    }
}

/// A provider's answer: geometry plus its own distance and duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGeometry {
    pub route: Route,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Trait for fetching driving routes.
pub trait RouteProvider: Send + Sync {
    fn fetch_route(
        &self,
        request: &TripRequest,
    ) -> impl Future<Output = Result<RouteGeometry, RouteProviderError>> + Send;
}

/// Provider that connects the requested points with straight lines.
///
/// Distance is the haversine length; duration assumes a constant speed.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineProvider {
    speed_kmh: f64,
}

impl StraightLineProvider {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }
}

impl Default for StraightLineProvider {
    fn default() -> Self {
        Self::new(90.0)
    }
}

impl RouteProvider for StraightLineProvider {
    async fn fetch_route(&self, request: &TripRequest) -> Result<RouteGeometry, RouteProviderError> {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(RouteProviderError::Unavailable(format!(
                "invalid speed {}",
                self.speed_kmh
            )));
        }

        let mut points = Vec::with_capacity(request.waypoints.len() + 2);
        points.push(request.origin);
        points.extend(request.waypoints.iter().copied());
        points.push(request.destination);

        let route = Route::new(points)
            .map_err(|e| RouteProviderError::InvalidResponse(e.to_string()))?;
        let distance_km = route.length_km();

        Ok(RouteGeometry {
            route,
            distance_m: distance_km * 1000.0,
            duration_s: distance_km / self.speed_kmh * 3600.0,
        })
    }
}
