// Location model representing geographic coordinates

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metres in one statute mile, as used for all travel costs.
pub const METERS_PER_MILE: f64 = 1609.0;

/// Represents a geographic point as a longitude/latitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lng: f64,
    pub lat: f64,
}

impl Location {
    /// Creates a new location from longitude and latitude
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Great-circle distance to another location in miles
    pub fn haversine_miles(&self, other: &Location) -> f64 {
        self.to_point().haversine_distance(&other.to_point()) / METERS_PER_MILE
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

// Rendered as "lng,lat", the order routing services expect
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}
