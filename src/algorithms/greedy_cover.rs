//! Greedy weighted set cover over a precomputed cost table.
//!
//! At every step the router moves to the unvisited store with the lowest
//! travel cost per newly covered item, measured from wherever the shopper
//! currently is. This is a greedy approximation: each step is locally optimal,
//! and the total cost of the resulting route is not guaranteed to be minimal.
//!
//! Ties on cost-per-item go to the store that comes first in the input order,
//! so the same request always yields the same route.
//!
//! The router never backtracks. If every unvisited store that still stocks a
//! needed item is unreachable from the current stop, the run ends with a
//! `RoutingError::NoRoute` naming that leg, even when visiting the stores in
//! another order would have worked. `UnsatisfiableCoverage` is reserved for
//! items that no remaining store stocks at all.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::algorithms::CoverSolver;
use crate::error::{RouterError, RoutingError};
use crate::models::{Cost, CostTable, RoutePath, Store, TargetSet, Visit, Waypoint};

/// Best store found so far in one selection round
#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    leg_cost: Cost,
    cost_per_item: Cost,
}

/// Greedy set-cover router
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyCover;

impl GreedyCover {
    pub fn new() -> Self {
        Self
    }

    /// Picks the next store to visit from `current`, or `None` if no unvisited
    /// reachable store supplies any needed item.
    fn select_next(
        &self,
        stores: &[Store],
        visited: &[bool],
        needed: &TargetSet,
        current: &Waypoint,
        costs: &CostTable,
    ) -> Result<Option<Candidate>, RouterError> {
        let mut best: Option<Candidate> = None;

        for (index, store) in stores.iter().enumerate() {
            if visited[index] {
                continue;
            }

            let gain = store.count_new_items(needed);
            if gain == 0 {
                continue;
            }

            let leg_cost = costs.require(current, &Waypoint::store(store.address.as_str()))?;
            if !leg_cost.is_finite() {
                continue;
            }

            let cost_per_item = leg_cost / gain as Cost;
            // Strict comparison keeps the earliest store on ties
            if best.map_or(true, |b| cost_per_item < b.cost_per_item) {
                best = Some(Candidate {
                    index,
                    leg_cost,
                    cost_per_item,
                });
            }
        }

        Ok(best)
    }
}

/// Error for a round with no viable candidate: an unreachable leg when some
/// unvisited store stocks a needed item, otherwise missing stock
fn dead_end(stores: &[Store], visited: &[bool], needed: TargetSet, current: &Waypoint) -> RouterError {
    let stocked_elsewhere = stores
        .iter()
        .zip(visited)
        .find(|(store, seen)| !**seen && store.count_new_items(&needed) > 0);

    match stocked_elsewhere {
        Some((store, _)) => RoutingError::NoRoute {
            from: current.to_string(),
            to: store.address.clone(),
        }
        .into(),
        None => RouterError::UnsatisfiableCoverage {
            remaining_items: needed,
        },
    }
}

pub(crate) fn check_unique_addresses(stores: &[Store]) -> Result<(), RouterError> {
    let mut seen = HashSet::new();
    for store in stores {
        if !seen.insert(store.address.as_str()) {
            return Err(RouterError::InvalidRequest(format!(
                "duplicate store address '{}'",
                store.address
            )));
        }
    }
    Ok(())
}

impl CoverSolver for GreedyCover {
    fn solve(
        &self,
        stores: &[Store],
        target: &TargetSet,
        costs: &CostTable,
    ) -> Result<RoutePath, RouterError> {
        check_unique_addresses(stores)?;

        let addresses: Vec<&str> = stores.iter().map(|s| s.address.as_str()).collect();
        costs.verify_complete(&addresses)?;

        // Items nobody stocks can be reported up front
        let unstocked: TargetSet = target
            .iter()
            .filter(|item| !stores.iter().any(|store| store.stocks(item)))
            .cloned()
            .collect();
        if !unstocked.is_empty() {
            return Err(RouterError::UnsatisfiableCoverage {
                remaining_items: unstocked,
            });
        }

        let mut visited = vec![false; stores.len()];
        let mut covered = TargetSet::new();
        let mut current = Waypoint::Start;
        let mut path = RoutePath::new();

        while covered.len() < target.len() {
            let needed: TargetSet = target.difference(&covered).cloned().collect();

            let Some(next) = self.select_next(stores, &visited, &needed, &current, costs)? else {
                return Err(dead_end(stores, &visited, needed, &current));
            };

            let store = &stores[next.index];
            let new_items = store.new_items(&needed);
            debug!(
                store = %store.address,
                leg_cost = next.leg_cost,
                cost_per_item = next.cost_per_item,
                new_items = new_items.len(),
                "selected store"
            );

            covered.extend(new_items.iter().cloned());
            visited[next.index] = true;
            current = Waypoint::store(store.address.as_str());
            path.push(Visit {
                store: store.address.clone(),
                leg_cost: next.leg_cost,
                new_items,
            });
        }

        info!(
            stops = path.len(),
            total_cost = path.total_cost(),
            "route covers all {} items",
            target.len()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;

    fn target(items: &[&str]) -> TargetSet {
        items.iter().map(Item::new).collect()
    }

    fn waypoint(name: &str) -> Waypoint {
        if name == "S" {
            Waypoint::Start
        } else {
            Waypoint::store(name)
        }
    }

    fn table(entries: &[(&str, &str, Cost)]) -> CostTable {
        let mut costs = CostTable::new();
        for &(a, b, cost) in entries {
            costs.insert(&waypoint(a), &waypoint(b), cost);
        }
        costs
    }

    #[test]
    fn test_picks_cheapest_per_item() {
        let stores = vec![
            Store::new("A", ["apple", "egg"]),
            Store::new("B", ["milk"]),
            Store::new("C", ["apple", "banana", "milk"]),
        ];
        let costs = table(&[
            ("S", "A", 2.0),
            ("S", "B", 5.0),
            ("S", "C", 1.0),
            ("A", "B", 3.0),
            ("A", "C", 4.0),
            ("B", "C", 2.0),
        ]);

        let path = GreedyCover::new()
            .solve(&stores, &target(&["apple", "milk"]), &costs)
            .unwrap();
        assert_eq!(path.stores(), vec!["C"]);
        assert_eq!(path.total_cost(), 1.0);
    }

    #[test]
    fn test_cost_is_measured_from_current_store() {
        // From the start A is cheapest; from A, B is cheaper than C
        let stores = vec![
            Store::new("A", ["apple"]),
            Store::new("B", ["milk"]),
            Store::new("C", ["milk"]),
        ];
        let costs = table(&[
            ("S", "A", 1.0),
            ("S", "B", 10.0),
            ("S", "C", 2.0),
            ("A", "B", 1.0),
            ("A", "C", 5.0),
            ("B", "C", 1.0),
        ]);

        let path = GreedyCover::new()
            .solve(&stores, &target(&["apple", "milk"]), &costs)
            .unwrap();
        assert_eq!(path.stores(), vec!["A", "B"]);
        assert_eq!(path.total_cost(), 2.0);
    }

    #[test]
    fn test_tie_goes_to_first_store() {
        let stores = vec![Store::new("X", ["milk"]), Store::new("Y", ["milk"])];
        let costs = table(&[("S", "X", 3.0), ("S", "Y", 3.0), ("X", "Y", 1.0)]);

        let path = GreedyCover::new()
            .solve(&stores, &target(&["milk"]), &costs)
            .unwrap();
        assert_eq!(path.stores(), vec!["X"]);

        // Reversing the input order reverses the choice
        let reversed: Vec<Store> = stores.into_iter().rev().collect();
        let path = GreedyCover::new()
            .solve(&reversed, &target(&["milk"]), &costs)
            .unwrap();
        assert_eq!(path.stores(), vec!["Y"]);
    }

    #[test]
    fn test_unstocked_item_is_named() {
        let stores = vec![Store::new("A", ["apple"])];
        let costs = table(&[("S", "A", 1.0)]);

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple", "caviar"]), &costs)
            .unwrap_err();
        match err {
            RouterError::UnsatisfiableCoverage { remaining_items } => {
                assert_eq!(remaining_items, target(&["caviar"]));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_store_is_not_a_candidate() {
        let stores = vec![Store::new("A", ["apple"]), Store::new("B", ["milk"])];
        let mut costs = table(&[("S", "A", 1.0)]);
        costs.insert_unreachable(&Waypoint::Start, &Waypoint::store("B"));
        costs.insert_unreachable(&Waypoint::store("A"), &Waypoint::store("B"));

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple", "milk"]), &costs)
            .unwrap_err();
        match err {
            RouterError::Routing(RoutingError::NoRoute { from, to }) => {
                assert_eq!(from, "A");
                assert_eq!(to, "B");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_greedy_dead_end_names_unreachable_leg() {
        // A is cheapest from the start but cannot reach B, the only milk
        // store; going via D would have worked
        let stores = vec![
            Store::new("A", ["apple"]),
            Store::new("D", ["apple"]),
            Store::new("B", ["milk"]),
        ];
        let mut costs = table(&[
            ("S", "A", 1.0),
            ("S", "D", 2.0),
            ("S", "B", 5.0),
            ("A", "D", 1.0),
            ("D", "B", 1.0),
        ]);
        costs.insert_unreachable(&Waypoint::store("A"), &Waypoint::store("B"));

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple", "milk"]), &costs)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            RoutingError::NoRoute {
                from: "A".to_string(),
                to: "B".to_string(),
            }
            .to_string()
        );
        assert!(!matches!(err, RouterError::UnsatisfiableCoverage { .. }));
    }

    #[test]
    fn test_first_stocking_store_is_named_on_dead_end() {
        let stores = vec![
            Store::new("A", ["apple"]),
            Store::new("B", ["milk"]),
            Store::new("C", ["milk"]),
        ];
        let mut costs = table(&[("S", "A", 1.0), ("B", "C", 1.0)]);
        costs.insert_unreachable(&Waypoint::Start, &Waypoint::store("B"));
        costs.insert_unreachable(&Waypoint::Start, &Waypoint::store("C"));
        costs.insert_unreachable(&Waypoint::store("A"), &Waypoint::store("B"));
        costs.insert_unreachable(&Waypoint::store("A"), &Waypoint::store("C"));

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple", "milk"]), &costs)
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Routing(RoutingError::NoRoute { ref to, .. }) if to == "B"
        ));
    }

    #[test]
    fn test_empty_target_gives_empty_route() {
        let stores = vec![Store::new("A", ["apple"])];
        let costs = table(&[("S", "A", 1.0)]);

        let path = GreedyCover::new()
            .solve(&stores, &TargetSet::new(), &costs)
            .unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_incomplete_table_is_rejected() {
        let stores = vec![Store::new("A", ["apple"]), Store::new("B", ["milk"])];
        let costs = table(&[("S", "A", 1.0), ("S", "B", 1.0)]);

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple"]), &costs)
            .unwrap_err();
        assert!(matches!(err, RouterError::IncompleteCostTable { .. }));
    }

    #[test]
    fn test_duplicate_addresses_are_rejected() {
        let stores = vec![Store::new("A", ["apple"]), Store::new("A", ["milk"])];
        let costs = table(&[("S", "A", 1.0)]);

        let err = GreedyCover::new()
            .solve(&stores, &target(&["apple"]), &costs)
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidRequest(_)));
    }

    #[test]
    fn test_zero_cost_store_wins() {
        let stores = vec![Store::new("A", ["apple"]), Store::new("B", ["apple"])];
        let costs = table(&[("S", "A", 0.5), ("S", "B", 0.0), ("A", "B", 1.0)]);

        let path = GreedyCover::new()
            .solve(&stores, &target(&["apple"]), &costs)
            .unwrap();
        assert_eq!(path.stores(), vec!["B"]);
    }

    #[test]
    fn test_travel_cost_and_satisfaction() {
        let stores = vec![Store::new("A", ["apple"]), Store::new("B", ["milk"])];
        let costs = table(&[("S", "A", 1.0), ("S", "B", 4.0), ("A", "B", 2.0)]);
        let solver = GreedyCover::new();

        assert_eq!(solver.calculate_travel_cost(&["A", "B"], &costs).unwrap(), 3.0);
        assert!(solver.satisfies_target(&["A", "B"], &stores, &target(&["apple", "milk"])));
        assert!(!solver.satisfies_target(&["A"], &stores, &target(&["apple", "milk"])));
    }
}
