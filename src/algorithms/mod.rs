pub mod greedy_cover;

// Common algorithm traits
use crate::error::RouterError;
use crate::models::{Cost, CostTable, RoutePath, Store, TargetSet, Waypoint};

/// Trait for solvers that pick an ordered set of stores covering a grocery list
pub trait CoverSolver {
    /// Compute the visiting order of stores that covers `target`
    fn solve(
        &self,
        stores: &[Store],
        target: &TargetSet,
        costs: &CostTable,
    ) -> Result<RoutePath, RouterError>;

    /// Check if visiting `route` (store addresses) acquires every target item
    fn satisfies_target(&self, route: &[&str], stores: &[Store], target: &TargetSet) -> bool {
        target.iter().all(|item| {
            route.iter().any(|address| {
                stores
                    .iter()
                    .any(|store| store.address == *address && store.stocks(item))
            })
        })
    }

    /// Total travel cost of visiting `route` in order, starting at the start waypoint
    fn calculate_travel_cost(&self, route: &[&str], costs: &CostTable) -> Result<Cost, RouterError> {
        let mut total = 0.0;
        let mut current = Waypoint::Start;
        for address in route {
            let next = Waypoint::store(*address);
            total += costs.require(&current, &next)?;
            current = next;
        }
        Ok(total)
    }
}
