// Route models for representing the planned store visits

use crate::models::{Cost, Item};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One stop on a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Address of the store visited
    pub store: String,

    /// Travel cost from the previous stop (or the start)
    pub leg_cost: Cost,

    /// Target items first covered at this stop
    pub new_items: BTreeSet<Item>,
}

/// Ordered sequence of store visits; insertion order is visiting order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub visits: Vec<Visit>,
}

impl RoutePath {
    /// Creates an empty route
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, visit: Visit) {
        self.visits.push(visit);
    }

    /// Store addresses in visiting order
    pub fn stores(&self) -> Vec<&str> {
        self.visits.iter().map(|v| v.store.as_str()).collect()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.visits.iter().any(|v| v.store == address)
    }

    /// Sum of all leg costs
    pub fn total_cost(&self) -> Cost {
        self.visits.iter().map(|v| v.leg_cost).sum()
    }

    /// Union of the items covered along the route
    pub fn covered_items(&self) -> BTreeSet<Item> {
        self.visits
            .iter()
            .flat_map(|v| v.new_items.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(store: &str, leg_cost: Cost, items: &[&str]) -> Visit {
        Visit {
            store: store.to_string(),
            leg_cost,
            new_items: items.iter().map(Item::new).collect(),
        }
    }

    #[test]
    fn test_route_summary() {
        let mut route = RoutePath::new();
        route.push(visit("C", 1.0, &["apple", "milk"]));
        route.push(visit("A", 4.0, &["egg"]));

        assert_eq!(route.stores(), vec!["C", "A"]);
        assert_eq!(route.total_cost(), 5.0);
        assert_eq!(route.covered_items().len(), 3);
        assert!(route.contains("A"));
        assert!(!route.contains("B"));
    }
}
