//! Response formats of the external geocoding and routing services.
//!
//! The crate does not perform HTTP itself. An embedding service fetches the
//! response bodies and hands them to these parsers, which map them onto the
//! crate's location, cost and error types.

use serde::Deserialize;

use crate::error::{GeocodeError, RoutingError};
use crate::models::{Cost, Location, METERS_PER_MILE};
use crate::oracle::TravelMode;

/// Distance and duration of a single routed leg
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteLeg {
    pub miles: Cost,
    pub minutes: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Parse a Google Geocoding API JSON body; the first result wins
pub fn parse_geocode_response(address: &str, body: &str) -> Result<Location, GeocodeError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Unavailable {
            address: address.to_string(),
            message: format!("malformed response: {}", e),
        })?;

    match response.status.as_str() {
        "OK" => response
            .results
            .first()
            .map(|r| Location::new(r.geometry.location.lng, r.geometry.location.lat))
            .ok_or_else(|| GeocodeError::NotFound {
                address: address.to_string(),
            }),
        "ZERO_RESULTS" => Err(GeocodeError::NotFound {
            address: address.to_string(),
        }),
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => Err(GeocodeError::Unavailable {
            address: address.to_string(),
            message: response.status,
        }),
        _ => Err(GeocodeError::Status {
            address: address.to_string(),
            status: response.status,
        }),
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Metres
    distance: f64,
    /// Seconds
    duration: f64,
}

/// Parse an OSRM `route` service JSON body; the first route wins
pub fn parse_osrm_route(
    from: &Location,
    to: &Location,
    body: &str,
) -> Result<RouteLeg, RoutingError> {
    let response: OsrmResponse =
        serde_json::from_str(body).map_err(|e| RoutingError::Unavailable {
            from: from.to_string(),
            to: to.to_string(),
            message: format!("malformed response: {}", e),
        })?;

    response
        .routes
        .first()
        .map(|route| RouteLeg {
            miles: route.distance / METERS_PER_MILE,
            minutes: route.duration / 60.0,
        })
        .ok_or_else(|| RoutingError::NoRoute {
            from: from.to_string(),
            to: to.to_string(),
        })
}

/// OSRM route request URL for two points
pub fn osrm_route_url(base_url: &str, from: &Location, to: &Location, mode: TravelMode) -> String {
    format!(
        "{}/route/v1/{}/{};{}?overview=false",
        base_url.trim_end_matches('/'),
        mode.profile(),
        from,
        to
    )
}
