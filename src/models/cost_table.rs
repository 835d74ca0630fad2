// Cost table: precomputed travel cost between every pair of waypoints

use crate::error::RouterError;
use crate::models::Cost;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifies a location within one routing request
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Waypoint {
    /// The shopper's starting point
    Start,
    /// A store, keyed by its address
    Store(String),
}

impl Waypoint {
    pub fn store<S: Into<String>>(address: S) -> Self {
        Waypoint::Store(address.into())
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waypoint::Start => f.write_str("start"),
            Waypoint::Store(address) => f.write_str(address),
        }
    }
}

/// Travel costs (miles) keyed by unordered waypoint pairs.
///
/// Each pair is stored once with its endpoints sorted, so `get(a, b)` and
/// `get(b, a)` always read the same entry. Unreachable pairs hold
/// `f64::INFINITY`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTable {
    costs: HashMap<(Waypoint, Waypoint), Cost>,
}

fn pair_key(a: &Waypoint, b: &Waypoint) -> (Waypoint, Waypoint) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

impl CostTable {
    /// Creates an empty cost table
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the cost between two waypoints, replacing any previous value.
    /// Negative and NaN costs are stored as unreachable.
    pub fn insert(&mut self, a: &Waypoint, b: &Waypoint, cost: Cost) {
        let cost = if cost.is_nan() || cost < 0.0 {
            Cost::INFINITY
        } else {
            cost
        };
        self.costs.insert(pair_key(a, b), cost);
    }

    /// Marks a pair as unreachable
    pub fn insert_unreachable(&mut self, a: &Waypoint, b: &Waypoint) {
        self.costs.insert(pair_key(a, b), Cost::INFINITY);
    }

    /// Gets the cost between two waypoints, if an entry exists.
    /// A waypoint is always at zero cost from itself.
    pub fn get(&self, a: &Waypoint, b: &Waypoint) -> Option<Cost> {
        if a == b {
            return Some(0.0);
        }
        self.costs.get(&pair_key(a, b)).copied()
    }

    /// Like [`CostTable::get`] but a missing entry is an error
    pub fn require(&self, a: &Waypoint, b: &Waypoint) -> Result<Cost, RouterError> {
        self.get(a, b).ok_or_else(|| RouterError::IncompleteCostTable {
            from: a.clone(),
            to: b.clone(),
        })
    }

    pub fn is_reachable(&self, a: &Waypoint, b: &Waypoint) -> bool {
        self.get(a, b).is_some_and(Cost::is_finite)
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Iterates over all stored pairs and their costs
    pub fn iter(&self) -> impl Iterator<Item = (&Waypoint, &Waypoint, Cost)> {
        self.costs.iter().map(|((a, b), cost)| (a, b, *cost))
    }

    /// Pairs whose cost is infinite, sorted for stable output
    pub fn unreachable_pairs(&self) -> Vec<(Waypoint, Waypoint)> {
        let mut pairs: Vec<_> = self
            .costs
            .iter()
            .filter(|(_, cost)| !cost.is_finite())
            .map(|(key, _)| key.clone())
            .collect();
        pairs.sort();
        pairs
    }

    /// Checks that every start-store and store-store pair has an entry
    pub fn verify_complete<S: AsRef<str>>(&self, addresses: &[S]) -> Result<(), RouterError> {
        let waypoints: Vec<Waypoint> = std::iter::once(Waypoint::Start)
            .chain(addresses.iter().map(|a| Waypoint::store(a.as_ref())))
            .collect();

        for i in 0..waypoints.len() {
            for j in (i + 1)..waypoints.len() {
                self.require(&waypoints[i], &waypoints[j])?;
            }
        }
        Ok(())
    }

    /// Stores for which every pair involving them is unreachable
    pub fn unusable_stores<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<String> {
        let waypoints: Vec<Waypoint> = std::iter::once(Waypoint::Start)
            .chain(addresses.iter().map(|a| Waypoint::store(a.as_ref())))
            .collect();

        addresses
            .iter()
            .map(AsRef::<str>::as_ref)
            .filter(|address| {
                let store = Waypoint::store(*address);
                waypoints
                    .iter()
                    .filter(|other| **other != store)
                    .all(|other| !self.is_reachable(&store, other))
            })
            .map(str::to_string)
            .collect()
    }
}
