// Provider implementations and persistence helpers

pub mod cache;
pub mod distance;
pub mod geocode;
pub mod road_network;
pub mod wire;

pub use self::distance::GreatCircleDistance;
pub use self::geocode::StaticGeocoder;
pub use self::road_network::RoadNetwork;
pub use self::wire::{osrm_route_url, parse_geocode_response, parse_osrm_route, RouteLeg};
