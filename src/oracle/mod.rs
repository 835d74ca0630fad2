//! Cost oracle: turns addresses into a complete travel-cost table.
//!
//! Geocoding and distance lookups go through the [`Geocoder`] and
//! [`DistanceProvider`] ports so the table builder never depends on a concrete
//! service. Offline implementations live in [`crate::utils`].

pub mod builder;
pub mod cancel;
pub mod resilient;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, RoutingError};
use crate::models::{Cost, Location};

pub use builder::{BuiltTable, CostOracle, ResolvedWaypoints, StartPoint};
pub use cancel::CancellationToken;
pub use resilient::Resilient;

/// Resolves free-text addresses to coordinates
pub trait Geocoder: Send + Sync {
    fn resolve(&self, address: &str) -> Result<Location, GeocodeError>;
}

/// Travel distance between two points, in miles
pub trait DistanceProvider: Send + Sync {
    fn route_cost(&self, from: &Location, to: &Location, mode: TravelMode)
        -> Result<Cost, RoutingError>;
}

impl<T: Geocoder + ?Sized> Geocoder for Arc<T> {
    fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        (**self).resolve(address)
    }
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for Arc<T> {
    fn route_cost(
        &self,
        from: &Location,
        to: &Location,
        mode: TravelMode,
    ) -> Result<Cost, RoutingError> {
        (**self).route_cost(from, to, mode)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        (**self).resolve(address)
    }
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for Box<T> {
    fn route_cost(
        &self,
        from: &Location,
        to: &Location,
        mode: TravelMode,
    ) -> Result<Cost, RoutingError> {
        (**self).route_cost(from, to, mode)
    }
}

/// How the shopper travels between stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl TravelMode {
    /// Routing profile name as used in OSRM request paths
    pub fn profile(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Cycling => "cycling",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "driving" | "drive" | "car" => Ok(TravelMode::Driving),
            "walking" | "walk" | "foot" => Ok(TravelMode::Walking),
            "cycling" | "bike" | "bicycle" => Ok(TravelMode::Cycling),
            other => Err(format!("unknown travel mode '{}'", other)),
        }
    }
}
