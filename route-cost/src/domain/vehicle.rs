//! Vehicle profile types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Fuel or energy carrier used by a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    #[serde(rename = "petrol_95")]
    Petrol95,
    #[serde(rename = "petrol_98")]
    Petrol98,
    #[serde(rename = "diesel")]
    Diesel,
    #[serde(rename = "lpg")]
    Lpg,
    #[serde(rename = "electric")]
    Electric,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Petrol95,
        FuelType::Petrol98,
        FuelType::Diesel,
        FuelType::Lpg,
        FuelType::Electric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol95 => "petrol_95",
            FuelType::Petrol98 => "petrol_98",
            FuelType::Diesel => "diesel",
            FuelType::Lpg => "lpg",
            FuelType::Electric => "electric",
        }
    }

    /// Unit the price and consumption are expressed in.
    pub fn unit(&self) -> &'static str {
        match self {
            FuelType::Electric => "kWh",
            _ => "l",
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FuelType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        FuelType::ALL
            .into_iter()
            .find(|fuel| fuel.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownFuelType(s.to_string()))
    }
}

/// Toll classification of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Car,
    Van,
    Truck,
    Motorcycle,
    Bus,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Car,
        VehicleClass::Van,
        VehicleClass::Truck,
        VehicleClass::Motorcycle,
        VehicleClass::Bus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Car => "car",
            VehicleClass::Van => "van",
            VehicleClass::Truck => "truck",
            VehicleClass::Motorcycle => "motorcycle",
            VehicleClass::Bus => "bus",
        }
    }

    /// Heavy vehicles pay distance-based tolls instead of vignettes.
    pub fn is_heavy(&self) -> bool {
        matches!(self, VehicleClass::Truck | VehicleClass::Bus)
    }

    /// Multiplier applied to the country's light or heavy per-km rate.
    pub fn toll_multiplier(&self) -> f64 {
        match self {
            VehicleClass::Car => 1.0,
            VehicleClass::Van => 1.5,
            VehicleClass::Motorcycle => 0.6,
            VehicleClass::Truck => 1.0,
            VehicleClass::Bus => 0.85,
        }
    }

    /// Typical fuel type and consumption per 100 km for the class.
    pub fn default_fuel(&self) -> (FuelType, f64) {
        match self {
            VehicleClass::Car => (FuelType::Petrol95, 7.0),
            VehicleClass::Van => (FuelType::Diesel, 9.5),
            VehicleClass::Truck => (FuelType::Diesel, 30.0),
            VehicleClass::Motorcycle => (FuelType::Petrol95, 4.5),
            VehicleClass::Bus => (FuelType::Diesel, 25.0),
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        VehicleClass::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownVehicleType(s.to_string()))
    }
}

/// What is being driven: fuel, toll class and consumption per 100 km.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    fuel_type: FuelType,
    vehicle_class: VehicleClass,
    consumption: f64,
}

impl VehicleProfile {
    /// Create a profile. Consumption must be positive and finite.
    pub fn new(
        fuel_type: FuelType,
        vehicle_class: VehicleClass,
        consumption: f64,
    ) -> Result<Self, ValidationError> {
        if !consumption.is_finite() || consumption <= 0.0 {
            return Err(ValidationError::InvalidConsumption(consumption));
        }
        Ok(Self {
            fuel_type,
            vehicle_class,
            consumption,
        })
    }

    /// Profile with the class's typical fuel type and consumption.
    pub fn for_class(vehicle_class: VehicleClass) -> Self {
        let (fuel_type, consumption) = vehicle_class.default_fuel();
        Self {
            fuel_type,
            vehicle_class,
            consumption,
        }
    }

    pub fn fuel_type(&self) -> FuelType {
        self.fuel_type
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    /// Units (litres or kWh) per 100 km.
    pub fn consumption(&self) -> f64 {
        self.consumption
    }
}
