// Straight-line distance provider

use crate::error::RoutingError;
use crate::models::{Cost, Location};
use crate::oracle::{DistanceProvider, TravelMode};

/// Ratio of typical road distance to great-circle distance for a travel mode
pub fn detour_factor(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Driving => 1.3,
        TravelMode::Walking | TravelMode::Cycling => 1.2,
    }
}

/// Estimates travel cost as great-circle miles scaled by a detour factor.
///
/// Never fails; used when no road data or routing service is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircleDistance;

impl DistanceProvider for GreatCircleDistance {
    fn route_cost(
        &self,
        from: &Location,
        to: &Location,
        mode: TravelMode,
    ) -> Result<Cost, RoutingError> {
        Ok(from.haversine_miles(to) * detour_factor(mode))
    }
}
