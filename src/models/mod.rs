// Models module - exports all model types

mod cost_table;
mod item;
mod location;
mod route;
mod shopping_list;
mod store;

// Re-export model types
pub use self::cost_table::{CostTable, Waypoint};
pub use self::item::Item;
pub use self::location::{Location, METERS_PER_MILE};
pub use self::route::{RoutePath, Visit};
pub use self::shopping_list::GroceryList;
pub use self::store::Store;

// Common type aliases for improved code readability
pub type Cost = f64;
pub type TargetSet = std::collections::BTreeSet<Item>;
