//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cost::TripCost;
use crate::domain::{
    CostBreakdown, CountryCost, FuelType, GeoPoint, QuoteSource, Route, ValidationError,
    VehicleClass, VehicleProfile,
};
use crate::route_provider::TripRequest;

/// A coordinate as sent by clients.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointInput {
    pub lat: f64,
    pub lng: f64,
}

impl PointInput {
    fn to_domain(self) -> Result<GeoPoint, ValidationError> {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Vehicle fields shared by cost and trip requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    /// One of car, van, truck, motorcycle, bus
    pub vehicle_type: String,

    /// Overrides the vehicle type's default fuel
    pub fuel_type: Option<String>,

    /// Units per 100 km; overrides the vehicle type's default
    pub consumption: Option<f64>,
}

impl VehicleInput {
    pub fn to_profile(&self) -> Result<VehicleProfile, ValidationError> {
        let class: VehicleClass = self.vehicle_type.parse()?;
        let (default_fuel, default_consumption) = class.default_fuel();
        let fuel = match &self.fuel_type {
            Some(fuel) => fuel.parse::<FuelType>()?,
            None => default_fuel,
        };
        VehicleProfile::new(fuel, class, self.consumption.unwrap_or(default_consumption))
    }
}

/// Request to price a route.
#[derive(Debug, Clone, Deserialize)]
pub struct CostRequest {
    /// Ordered route points, at least 2
    pub route: Vec<PointInput>,

    #[serde(flatten)]
    pub vehicle: VehicleInput,
}

impl CostRequest {
    /// Validate into domain types. Route problems are reported first.
    pub fn to_domain(&self) -> Result<(Route, VehicleProfile), ValidationError> {
        if self.route.len() < 2 {
            return Err(ValidationError::TooFewPoints {
                found: self.route.len(),
            });
        }
        let points = self
            .route
            .iter()
            .map(|p| p.to_domain())
            .collect::<Result<Vec<_>, _>>()?;
        let route = Route::new(points)?;
        Ok((route, self.vehicle.to_profile()?))
    }
}

/// Request to route and price a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct TripCostRequest {
    pub origin: PointInput,
    pub destination: PointInput,
    #[serde(default)]
    pub waypoints: Vec<PointInput>,

    #[serde(flatten)]
    pub vehicle: VehicleInput,
}

impl TripCostRequest {
    pub fn to_domain(&self) -> Result<(TripRequest, VehicleProfile), ValidationError> {
        let waypoints = self
            .waypoints
            .iter()
            .map(|p| p.to_domain())
            .collect::<Result<Vec<_>, _>>()?;
        let request = TripRequest::new(self.origin.to_domain()?, self.destination.to_domain()?)
            .with_waypoints(waypoints);
        Ok((request, self.vehicle.to_profile()?))
    }
}

/// Query for point classification.
#[derive(Debug, Deserialize)]
pub struct ClassifyQuery {
    pub lat: f64,
    pub lng: f64,
}

/// Fuel detail for one country.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelResult {
    pub fuel_type: FuelType,
    pub price_per_unit: f64,
    /// "l" or "kWh"
    pub unit: &'static str,
    pub units: f64,
    pub cost: f64,
    pub source: QuoteSource,
}

/// Toll detail for one country.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TollResult {
    pub amount: f64,
    pub currency: String,
    pub source: QuoteSource,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_currency: Option<String>,
}

/// Priced detail for one country share.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryCostResult {
    pub country: String,
    pub distance_km: f64,
    pub fuel: FuelResult,
    pub toll: TollResult,
    pub is_estimated: bool,
}

/// Response for route pricing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    pub fuel_cost: f64,
    pub toll_cost: f64,
    /// Sum of the rounded fuel and toll costs.
    pub total_cost: f64,
    pub currency: String,
    pub distance_km: f64,
    pub is_estimated: bool,
    pub per_country: Vec<CountryCostResult>,
}

/// Response for trip pricing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCostResponse {
    pub distance_km: f64,
    pub duration_mins: f64,
    #[serde(flatten)]
    pub cost: CostResponse,
}

/// Response for point classification.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub lat: f64,
    pub lng: f64,
    /// `None` outside every known region
    pub country: Option<String>,
}

/// Response for cache invalidation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateResponse {
    /// Approximate number of entries dropped.
    pub invalidated_entries: u64,
}

/// Response for a price store reload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub fuel_prices: usize,
    pub toll_segments: usize,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable category
    pub kind: &'static str,

    /// Error message
    pub error: String,
}

// Conversion implementations

impl CountryCostResult {
    /// Create from a domain CountryCost.
    pub fn from_country_cost(cost: &CountryCost) -> Self {
        Self {
            country: cost.country.as_str().to_string(),
            distance_km: round_to(cost.distance_km, 1),
            fuel: FuelResult {
                fuel_type: cost.fuel.fuel_type,
                price_per_unit: round_to(cost.fuel.price_per_unit, 3),
                unit: cost.fuel.fuel_type.unit(),
                units: round_to(cost.fuel_units, 2),
                cost: round_to(cost.fuel_cost, 2),
                source: cost.fuel.source,
            },
            toll: TollResult {
                amount: round_to(cost.toll.amount, 2),
                currency: cost.toll.currency.as_str().to_string(),
                source: cost.toll.source,
                description: cost.toll.description.clone(),
                unknown_currency: cost.toll.unknown_currency.map(|c| c.as_str().to_string()),
            },
            is_estimated: !cost.is_precise(),
        }
    }
}

impl CostResponse {
    /// Create from a domain CostBreakdown, rounding money to cents.
    pub fn from_breakdown(breakdown: &CostBreakdown) -> Self {
        let fuel_cost = round_to(breakdown.fuel_cost, 2);
        let toll_cost = round_to(breakdown.toll_cost, 2);

        Self {
            fuel_cost,
            toll_cost,
            total_cost: round_to(fuel_cost + toll_cost, 2),
            currency: breakdown.currency.as_str().to_string(),
            distance_km: round_to(breakdown.distance_km, 1),
            is_estimated: breakdown.is_estimated,
            per_country: breakdown
                .per_country
                .iter()
                .map(CountryCostResult::from_country_cost)
                .collect(),
        }
    }
}

impl TripCostResponse {
    /// Create from a priced trip.
    pub fn from_trip(trip: &TripCost) -> Self {
        Self {
            distance_km: round_to(trip.distance_m / 1000.0, 1),
            duration_mins: round_to(trip.duration_s / 60.0, 0),
            cost: CostResponse::from_breakdown(&trip.breakdown),
        }
    }
}

/// Round half away from zero to `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountryCode, CurrencyCode, FuelPriceQuote, TollChargeQuote};

    fn vehicle(kind: &str) -> VehicleInput {
        VehicleInput {
            vehicle_type: kind.into(),
            fuel_type: None,
            consumption: None,
        }
    }

    fn point(lat: f64, lng: f64) -> PointInput {
        PointInput { lat, lng }
    }

    #[test]
    fn request_deserializes_from_json() {
        let json = r#"{
            "route": [{"lat": 54.6872, "lng": 25.2797}, {"lat": 54.8978, "lng": 23.9094}],
            "vehicleType": "car"
        }"#;
        let request: CostRequest = serde_json::from_str(json).unwrap();
        let (route, profile) = request.to_domain().unwrap();

        assert_eq!(route.len(), 2);
        assert_eq!(profile.vehicle_class(), VehicleClass::Car);
        assert_eq!(profile.fuel_type(), FuelType::Petrol95);
        assert_eq!(profile.consumption(), 7.0);
    }

    #[test]
    fn overrides_apply() {
        let json = r#"{
            "route": [{"lat": 48.0, "lng": 2.0}, {"lat": 47.0, "lng": 3.0}],
            "vehicleType": "van",
            "fuelType": "lpg",
            "consumption": 11.5
        }"#;
        let request: CostRequest = serde_json::from_str(json).unwrap();
        let (_, profile) = request.to_domain().unwrap();

        assert_eq!(profile.fuel_type(), FuelType::Lpg);
        assert_eq!(profile.consumption(), 11.5);
    }

    #[test]
    fn validation_failures() {
        let too_short = CostRequest {
            route: vec![point(48.0, 2.0)],
            vehicle: vehicle("car"),
        };
        assert_eq!(
            too_short.to_domain().unwrap_err(),
            ValidationError::TooFewPoints { found: 1 }
        );

        let bad_point = CostRequest {
            route: vec![point(48.0, 2.0), point(95.0, 2.0)],
            vehicle: vehicle("car"),
        };
        assert!(matches!(
            bad_point.to_domain().unwrap_err(),
            ValidationError::InvalidCoordinate { .. }
        ));

        let bad_vehicle = CostRequest {
            route: vec![point(48.0, 2.0), point(47.0, 3.0)],
            vehicle: vehicle("hovercraft"),
        };
        assert_eq!(
            bad_vehicle.to_domain().unwrap_err(),
            ValidationError::UnknownVehicleType("hovercraft".into())
        );

        let bad_consumption = CostRequest {
            route: vec![point(48.0, 2.0), point(47.0, 3.0)],
            vehicle: VehicleInput {
                consumption: Some(0.0),
                ..vehicle("car")
            },
        };
        assert_eq!(
            bad_consumption.to_domain().unwrap_err(),
            ValidationError::InvalidConsumption(0.0)
        );
    }

    #[test]
    fn trip_request_with_waypoints() {
        let json = r#"{
            "origin": {"lat": 48.8566, "lng": 2.3522},
            "destination": {"lat": 45.7640, "lng": 4.8357},
            "waypoints": [{"lat": 47.32, "lng": 5.04}],
            "vehicleType": "truck"
        }"#;
        let request: TripCostRequest = serde_json::from_str(json).unwrap();
        let (trip, profile) = request.to_domain().unwrap();

        assert_eq!(trip.waypoints.len(), 1);
        assert_eq!(profile.fuel_type(), FuelType::Diesel);
    }

    #[test]
    fn response_rounds_and_totals_rounded_parts() {
        let fr = CountryCode::parse("FR").unwrap();
        let cost = CountryCost {
            country: fr,
            distance_km: 392.217,
            fuel_units: 27.455,
            fuel_cost: 50.791_234,
            fuel: FuelPriceQuote {
                country: fr,
                fuel_type: FuelType::Petrol95,
                price_per_unit: 1.8499,
                source: QuoteSource::Estimated,
            },
            toll: TollChargeQuote {
                country: fr,
                amount: 35.299_5,
                currency: CurrencyCode::EUR,
                source: QuoteSource::Estimated,
                description: "estimated".into(),
                unknown_currency: None,
            },
        };
        let breakdown = CostBreakdown::from_countries(vec![cost], CurrencyCode::EUR, false);
        let response = CostResponse::from_breakdown(&breakdown);

        assert_eq!(response.fuel_cost, 50.79);
        assert_eq!(response.toll_cost, 35.3);
        assert_eq!(response.total_cost, 86.09);
        assert_eq!(response.distance_km, 392.2);
        assert!(response.is_estimated);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["perCountry"][0]["fuel"]["unit"], "l");
        assert_eq!(json["perCountry"][0]["toll"]["source"], "estimated");
        assert!(json["perCountry"][0]["toll"].get("unknownCurrency").is_none());
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(2.344, 2), 2.34);
        assert_eq!(round_to(7.25, 1), 7.3);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
