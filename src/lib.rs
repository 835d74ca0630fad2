// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod oracle;
pub mod planner;
pub mod utils;

// Re-exports for convenience
pub use algorithms::greedy_cover::GreedyCover;
pub use config::RouterConfig;
pub use error::{GeocodeError, RouterError, RoutingError};
pub use models::{CostTable, GroceryList, Item, Location, RoutePath, Store, TargetSet, Waypoint};
pub use planner::{RoutePlan, RoutePlanner, RouteRequest};
