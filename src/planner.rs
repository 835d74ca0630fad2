//! Route planner: the entry point that ties the cost oracle and the greedy
//! router together for one request.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::algorithms::greedy_cover::{check_unique_addresses, GreedyCover};
use crate::algorithms::CoverSolver;
use crate::config::RouterConfig;
use crate::error::RouterError;
use crate::models::{CostTable, GroceryList, RoutePath, Store, TargetSet, Waypoint};
use crate::oracle::{
    BuiltTable, CancellationToken, CostOracle, DistanceProvider, Geocoder, Resilient, StartPoint,
};
use crate::utils::cache::CachedCostTable;

/// One routing request as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    /// Where the shopper starts
    pub start: StartPoint,

    /// Candidate stores in preference order; earlier stores win ties
    pub stores: Vec<Store>,

    /// Items to acquire, normalized on use
    pub items: Vec<String>,
}

impl RouteRequest {
    pub fn target(&self) -> TargetSet {
        self.items.iter().collect::<GroceryList>().into_target_set()
    }
}

/// Result of a successful planning run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Stores to visit, in order
    pub route: RoutePath,

    /// Stores dropped because their address could not be geocoded
    pub skipped_stores: Vec<String>,

    /// Stores unreachable from every other location
    pub unusable_stores: Vec<String>,

    /// Number of pairs in the cost table with no route
    pub unreachable_pairs: usize,
}

/// Plans shopping routes: builds the cost table, then runs the greedy router
pub struct RoutePlanner<G, D> {
    oracle: CostOracle<G, D>,
    solver: GreedyCover,
}

impl<G, D> RoutePlanner<Resilient<G>, Resilient<D>>
where
    G: Geocoder + 'static,
    D: DistanceProvider + 'static,
{
    /// Creates a planner whose providers are wrapped with the configured
    /// timeout and retry budget
    pub fn new(geocoder: G, distances: D, config: &RouterConfig) -> Result<Self, RouterError> {
        let timeout = config.request_timeout();
        let oracle = CostOracle::new(
            Resilient::new(geocoder, timeout, config.max_retries),
            Resilient::new(distances, timeout, config.max_retries),
            config,
        )?;
        Ok(Self::from_oracle(oracle))
    }
}

impl<G: Geocoder, D: DistanceProvider> RoutePlanner<G, D> {
    pub fn from_oracle(oracle: CostOracle<G, D>) -> Self {
        Self {
            oracle,
            solver: GreedyCover::new(),
        }
    }

    pub fn oracle(&self) -> &CostOracle<G, D> {
        &self.oracle
    }

    /// Stores worth routing to, after checking every item is stocked somewhere
    fn relevant_stores(&self, request: &RouteRequest) -> Result<(TargetSet, Vec<Store>), RouterError> {
        check_unique_addresses(&request.stores)?;

        let list: GroceryList = request.items.iter().collect();
        let missing = list.uncoverable_items(&request.stores);
        if !missing.is_empty() {
            return Err(RouterError::UnsatisfiableCoverage {
                remaining_items: missing,
            });
        }

        let relevant: Vec<Store> = list
            .find_relevant_stores(&request.stores)
            .into_iter()
            .cloned()
            .collect();
        Ok((list.into_target_set(), relevant))
    }

    /// Plans a route for `request`, querying the providers for a fresh table
    pub fn plan(
        &self,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<(RoutePlan, CostTable), RouterError> {
        let (target, stores) = self.relevant_stores(request)?;
        if target.is_empty() {
            return Ok((RoutePlan::default(), CostTable::new()));
        }
        info!(
            items = target.len(),
            stores = stores.len(),
            candidates = request.stores.len(),
            "planning route"
        );

        let addresses: Vec<String> = stores.iter().map(|s| s.address.clone()).collect();
        let built = self
            .oracle
            .build_cost_table(&request.start, &addresses, cancel)?;

        let plan = self.route_over_built(&target, stores, &built)?;
        Ok((plan, built.table))
    }

    /// Plans a route reusing `cached` when it was computed for the same
    /// travel mode, start and store coordinates as this request.
    ///
    /// Addresses are always geocoded so the comparison sees where the stores
    /// are now; routing calls are skipped when the cache covers the request.
    /// Returns the freshly built table when one had to be computed.
    pub fn plan_cached(
        &self,
        request: &RouteRequest,
        cached: Option<&CachedCostTable>,
        cancel: &CancellationToken,
    ) -> Result<(RoutePlan, Option<CachedCostTable>), RouterError> {
        let (target, stores) = self.relevant_stores(request)?;
        if target.is_empty() {
            return Ok((RoutePlan::default(), None));
        }

        let addresses: Vec<String> = stores.iter().map(|s| s.address.clone()).collect();
        let resolved = self
            .oracle
            .resolve_waypoints(&request.start, &addresses, cancel)?;

        if let Some(cached) = cached.filter(|c| c.covers(self.oracle.mode(), &resolved)) {
            info!(stores = resolved.stores.len(), "reusing cached cost table");
            let usable = keep_resolved(stores, &resolved.addresses());
            let route = self.solver.solve(&usable, &target, &cached.table)?;
            let usable_addresses = resolved.addresses();
            let plan = RoutePlan {
                route,
                unusable_stores: cached.table.unusable_stores(&usable_addresses),
                unreachable_pairs: count_unreachable(&cached.table, &usable_addresses),
                skipped_stores: resolved.skipped,
            };
            return Ok((plan, None));
        }

        info!(
            items = target.len(),
            stores = stores.len(),
            "no matching cached table, computing travel costs"
        );
        let built = self.oracle.price_waypoints(resolved, cancel)?;
        let plan = self.route_over_built(&target, stores, &built)?;
        let fresh = CachedCostTable::from_built(&built, self.oracle.mode());
        Ok((plan, Some(fresh)))
    }

    fn route_over_built(
        &self,
        target: &TargetSet,
        stores: Vec<Store>,
        built: &BuiltTable,
    ) -> Result<RoutePlan, RouterError> {
        let usable = keep_resolved(stores, &built.addresses());
        let route = self.solver.solve(&usable, target, &built.table)?;
        Ok(RoutePlan {
            route,
            skipped_stores: built.skipped.clone(),
            unusable_stores: built.unusable.clone(),
            unreachable_pairs: built.table.unreachable_pairs().len(),
        })
    }

    /// Plans a route over an existing cost table without calling any provider.
    ///
    /// The table is trusted to match the request's start and travel mode; use
    /// [`RoutePlanner::plan_cached`] for tables that may be stale.
    pub fn plan_with_table(
        &self,
        request: &RouteRequest,
        table: &CostTable,
    ) -> Result<RoutePlan, RouterError> {
        let (target, stores) = self.relevant_stores(request)?;
        if target.is_empty() {
            return Ok(RoutePlan::default());
        }

        let route = self.solver.solve(&stores, &target, table)?;
        let addresses: Vec<&str> = stores.iter().map(|s| s.address.as_str()).collect();
        Ok(RoutePlan {
            route,
            skipped_stores: Vec::new(),
            unusable_stores: table.unusable_stores(&addresses),
            unreachable_pairs: table.unreachable_pairs().len(),
        })
    }
}

/// Stores that made it into the table, in input order
fn keep_resolved(stores: Vec<Store>, addresses: &[&str]) -> Vec<Store> {
    let resolved: HashSet<&str> = addresses.iter().copied().collect();
    stores
        .into_iter()
        .filter(|s| resolved.contains(s.address.as_str()))
        .collect()
}

// A cached table may hold stores this request does not use
fn count_unreachable(table: &CostTable, addresses: &[&str]) -> usize {
    let in_request = |w: &Waypoint| match w {
        Waypoint::Start => true,
        Waypoint::Store(address) => addresses.contains(&address.as_str()),
    };
    table
        .unreachable_pairs()
        .iter()
        .filter(|(a, b)| in_request(a) && in_request(b))
        .count()
}
