//! Cost table construction.
//!
//! The build resolves every address, then queries the distance provider for
//! all start-store and store-store pairs on a bounded rayon pool. Results are
//! only written into the [`CostTable`] once every query has returned, so the
//! router never sees a partially built table. A failed distance query marks
//! its pair as unreachable instead of failing the whole build.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{GeocodePolicy, RouterConfig};
use crate::error::{GeocodeError, RouterError, RoutingError};
use crate::models::{Cost, CostTable, Location, Waypoint};
use crate::oracle::{CancellationToken, DistanceProvider, Geocoder, TravelMode};

/// Where the shopper starts: a raw address or already-known coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartPoint {
    Coordinates(Location),
    Address(String),
}

/// Coordinates of the start and of every store that could be geocoded
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWaypoints {
    pub start: Location,

    /// Resolved stores in input order
    pub stores: Vec<(String, Location)>,

    /// Stores dropped because their address could not be resolved
    pub skipped: Vec<String>,
}

impl ResolvedWaypoints {
    pub fn addresses(&self) -> Vec<&str> {
        self.stores.iter().map(|(a, _)| a.as_str()).collect()
    }
}

/// A finished cost table together with what was resolved to build it
#[derive(Debug, Clone)]
pub struct BuiltTable {
    pub table: CostTable,

    /// Resolved start coordinates
    pub start: Location,

    /// Stores that made it into the table, in input order, with coordinates
    pub stores: Vec<(String, Location)>,

    /// Stores dropped because their address could not be resolved
    pub skipped: Vec<String>,

    /// Stores for which every pair in the table is unreachable
    pub unusable: Vec<String>,
}

impl BuiltTable {
    pub fn addresses(&self) -> Vec<&str> {
        self.stores.iter().map(|(a, _)| a.as_str()).collect()
    }
}

/// Builds complete cost tables from a geocoder and a distance provider
pub struct CostOracle<G, D> {
    geocoder: G,
    distances: D,
    mode: TravelMode,
    policy: GeocodePolicy,
    pool: ThreadPool,
}

impl<G: Geocoder, D: DistanceProvider> CostOracle<G, D> {
    /// Creates an oracle whose pair queries run on a pool of
    /// `config.worker_threads` threads (0 lets rayon decide)
    pub fn new(geocoder: G, distances: D, config: &RouterConfig) -> Result<Self, RouterError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("cost-oracle-{}", i))
            .build()
            .map_err(|e| RouterError::WorkerPool(e.to_string()))?;

        Ok(Self {
            geocoder,
            distances,
            mode: config.travel_mode,
            policy: config.geocode_policy,
            pool,
        })
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Resolves an address, rejecting non-finite coordinates
    pub fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        let location = self.geocoder.resolve(address)?;
        if !location.is_finite() {
            return Err(GeocodeError::NotFound {
                address: address.to_string(),
            });
        }
        Ok(location)
    }

    /// Travel cost in miles between two resolved locations
    pub fn route_cost(&self, from: &Location, to: &Location) -> Result<Cost, RoutingError> {
        self.distances.route_cost(from, to, self.mode)
    }

    fn resolve_start(
        &self,
        start: &StartPoint,
        cancel: &CancellationToken,
    ) -> Result<Location, RouterError> {
        match start {
            StartPoint::Coordinates(location) if location.is_finite() => Ok(*location),
            StartPoint::Coordinates(location) => Err(RouterError::InvalidRequest(format!(
                "start coordinates {} are not finite",
                location
            ))),
            StartPoint::Address(address) => {
                if cancel.is_cancelled() {
                    return Err(RouterError::Cancelled);
                }
                Ok(self.resolve(address)?)
            }
        }
    }

    /// Geocodes all store addresses, applying the configured failure policy
    fn resolve_stores(
        &self,
        addresses: &[String],
        cancel: &CancellationToken,
    ) -> Result<(Vec<(String, Location)>, Vec<String>), RouterError> {
        let results: Vec<Option<Result<Location, GeocodeError>>> = self.pool.install(|| {
            addresses
                .par_iter()
                .map(|address| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.resolve(address))
                    }
                })
                .collect()
        });

        if cancel.is_cancelled() {
            return Err(RouterError::Cancelled);
        }

        let mut resolved = Vec::with_capacity(addresses.len());
        let mut skipped = Vec::new();
        for (address, result) in addresses.iter().zip(results) {
            match result {
                Some(Ok(location)) => resolved.push((address.clone(), location)),
                Some(Err(err)) => match self.policy {
                    GeocodePolicy::Abort => return Err(err.into()),
                    GeocodePolicy::SkipStore => {
                        warn!(store = %address, error = %err, "skipping store that could not be geocoded");
                        skipped.push(address.clone());
                    }
                },
                None => return Err(RouterError::Cancelled),
            }
        }

        Ok((resolved, skipped))
    }

    /// Builds the complete cost table for `start` and `addresses`.
    ///
    /// Issues one geocoding call per address (plus one for an address start)
    /// and one routing call per start-store and store-store pair.
    pub fn build_cost_table(
        &self,
        start: &StartPoint,
        addresses: &[String],
        cancel: &CancellationToken,
    ) -> Result<BuiltTable, RouterError> {
        let resolved = self.resolve_waypoints(start, addresses, cancel)?;
        self.price_waypoints(resolved, cancel)
    }

    /// Geocodes the start and all store addresses without any routing calls
    pub fn resolve_waypoints(
        &self,
        start: &StartPoint,
        addresses: &[String],
        cancel: &CancellationToken,
    ) -> Result<ResolvedWaypoints, RouterError> {
        let start = self.resolve_start(start, cancel)?;
        let (stores, skipped) = self.resolve_stores(addresses, cancel)?;
        Ok(ResolvedWaypoints {
            start,
            stores,
            skipped,
        })
    }

    /// Queries the distance provider for every pair of resolved waypoints
    pub fn price_waypoints(
        &self,
        resolved: ResolvedWaypoints,
        cancel: &CancellationToken,
    ) -> Result<BuiltTable, RouterError> {
        let ResolvedWaypoints {
            start: start_location,
            stores,
            skipped,
        } = resolved;

        let waypoints: Vec<(Waypoint, Location)> = std::iter::once((Waypoint::Start, start_location))
            .chain(
                stores
                    .iter()
                    .map(|(address, location)| (Waypoint::store(address.as_str()), *location)),
            )
            .collect();

        let pairs: Vec<(usize, usize)> = (0..waypoints.len())
            .flat_map(|i| ((i + 1)..waypoints.len()).map(move |j| (i, j)))
            .collect();
        info!(
            stores = stores.len(),
            pairs = pairs.len(),
            mode = %self.mode,
            "computing travel costs"
        );

        let results: Vec<Option<Result<Cost, RoutingError>>> = self.pool.install(|| {
            pairs
                .par_iter()
                .map(|&(i, j)| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.route_cost(&waypoints[i].1, &waypoints[j].1))
                    }
                })
                .collect()
        });

        if cancel.is_cancelled() || results.iter().any(Option::is_none) {
            return Err(RouterError::Cancelled);
        }

        let mut table = CostTable::new();
        for (&(i, j), result) in pairs.iter().zip(results.into_iter().flatten()) {
            let (a, b) = (&waypoints[i].0, &waypoints[j].0);
            match result {
                Ok(cost) => table.insert(a, b, cost),
                Err(err) => {
                    warn!(from = %a, to = %b, error = %err, "pair unreachable");
                    table.insert_unreachable(a, b);
                }
            }
        }

        let usable: Vec<&str> = stores.iter().map(|(a, _)| a.as_str()).collect();
        let unusable = table.unusable_stores(&usable);
        for address in &unusable {
            warn!(store = %address, "store is unreachable from every other location");
        }

        info!(
            entries = table.len(),
            unreachable = table.unreachable_pairs().len(),
            "cost table complete"
        );

        Ok(BuiltTable {
            table,
            start: start_location,
            stores,
            skipped,
            unusable,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::StaticGeocoder;

    /// Distance = |Δlng| + |Δlat|, failing for any pair touching `broken`
    struct GridDistance {
        broken: Option<Location>,
    }

    impl DistanceProvider for GridDistance {
        fn route_cost(
            &self,
            from: &Location,
            to: &Location,
            _mode: TravelMode,
        ) -> Result<Cost, RoutingError> {
            if self.broken == Some(*from) || self.broken == Some(*to) {
                return Err(RoutingError::NoRoute {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            Ok((from.lng - to.lng).abs() + (from.lat - to.lat).abs())
        }
    }

    fn geocoder() -> StaticGeocoder {
        let mut geocoder = StaticGeocoder::new();
        geocoder.insert("A", Location::new(1.0, 0.0));
        geocoder.insert("B", Location::new(0.0, 2.0));
        geocoder.insert("C", Location::new(3.0, 3.0));
        geocoder.insert("Home", Location::new(0.0, 0.0));
        geocoder
    }

    fn config(policy: GeocodePolicy) -> RouterConfig {
        RouterConfig {
            worker_threads: 2,
            geocode_policy: policy,
            ..RouterConfig::default()
        }
    }

    fn addresses(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_is_complete_and_symmetric() {
        let oracle =
            CostOracle::new(geocoder(), GridDistance { broken: None }, &config(GeocodePolicy::Abort))
                .unwrap();
        let built = oracle
            .build_cost_table(
                &StartPoint::Address("Home".into()),
                &addresses(&["A", "B", "C"]),
                &CancellationToken::new(),
            )
            .unwrap();

        // 3 start-store pairs + 3 store-store pairs
        assert_eq!(built.table.len(), 6);
        assert!(built.table.verify_complete(&built.addresses()).is_ok());
        assert_eq!(
            built.table.get(&Waypoint::Start, &Waypoint::store("C")),
            Some(6.0)
        );
        for (a, b, cost) in built.table.iter() {
            assert_eq!(built.table.get(b, a), Some(cost));
        }
    }

    #[test]
    fn test_failed_pair_is_marked_unreachable() {
        let distances = GridDistance {
            broken: Some(Location::new(0.0, 2.0)),
        };
        let oracle = CostOracle::new(geocoder(), distances, &config(GeocodePolicy::Abort)).unwrap();
        let built = oracle
            .build_cost_table(
                &StartPoint::Coordinates(Location::new(0.0, 0.0)),
                &addresses(&["A", "B", "C"]),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(built.table.len(), 6);
        assert!(built.table.is_reachable(&Waypoint::Start, &Waypoint::store("A")));
        assert!(built.table.is_reachable(&Waypoint::store("A"), &Waypoint::store("C")));
        assert!(!built.table.is_reachable(&Waypoint::store("A"), &Waypoint::store("B")));
        assert_eq!(built.table.unreachable_pairs().len(), 3);
        assert_eq!(built.unusable, vec!["B".to_string()]);
    }

    #[test]
    fn test_geocode_failure_aborts_by_default() {
        let oracle =
            CostOracle::new(geocoder(), GridDistance { broken: None }, &config(GeocodePolicy::Abort))
                .unwrap();
        let err = oracle
            .build_cost_table(
                &StartPoint::Address("Home".into()),
                &addresses(&["A", "Atlantis"]),
                &CancellationToken::new(),
            )
            .unwrap_err();
        match err {
            RouterError::Geocode(e) => assert_eq!(e.address(), "Atlantis"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_geocode_failure_can_skip_store() {
        let oracle = CostOracle::new(
            geocoder(),
            GridDistance { broken: None },
            &config(GeocodePolicy::SkipStore),
        )
        .unwrap();
        let built = oracle
            .build_cost_table(
                &StartPoint::Address("Home".into()),
                &addresses(&["A", "Atlantis", "B"]),
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(built.addresses(), vec!["A", "B"]);
        assert_eq!(built.skipped, vec!["Atlantis".to_string()]);
        assert_eq!(built.table.len(), 3);
    }

    #[test]
    fn test_unresolvable_start_always_aborts() {
        let oracle = CostOracle::new(
            geocoder(),
            GridDistance { broken: None },
            &config(GeocodePolicy::SkipStore),
        )
        .unwrap();
        let err = oracle
            .build_cost_table(
                &StartPoint::Address("Atlantis".into()),
                &addresses(&["A"]),
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::Geocode(_)));
    }

    #[test]
    fn test_cancelled_build() {
        let oracle =
            CostOracle::new(geocoder(), GridDistance { broken: None }, &config(GeocodePolicy::Abort))
                .unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = oracle
            .build_cost_table(
                &StartPoint::Coordinates(Location::new(0.0, 0.0)),
                &addresses(&["A", "B"]),
                &cancel,
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::Cancelled));
    }

    #[test]
    fn test_non_finite_start_is_rejected() {
        let oracle =
            CostOracle::new(geocoder(), GridDistance { broken: None }, &config(GeocodePolicy::Abort))
                .unwrap();
        let err = oracle
            .build_cost_table(
                &StartPoint::Coordinates(Location::new(f64::NAN, 0.0)),
                &addresses(&["A"]),
                &CancellationToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, RouterError::InvalidRequest(_)));
    }
}
