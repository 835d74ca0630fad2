use crate::error::RouterError;
use crate::models::{Cost, CostTable, Location, Waypoint};
use crate::oracle::{BuiltTable, ResolvedWaypoints, TravelMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

// Coordinates closer than this (degrees) are the same place
const LOCATION_TOLERANCE: f64 = 1e-9;

/// A cost table plus the inputs it was computed from.
///
/// Costs depend on the travel mode and on where the start and the stores
/// are, so a table is only reused for a request that resolves to the same
/// mode and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCostTable {
    pub mode: TravelMode,
    pub start: Location,
    pub stores: Vec<(String, Location)>,
    pub table: CostTable,
}

impl CachedCostTable {
    pub fn from_built(built: &BuiltTable, mode: TravelMode) -> Self {
        Self {
            mode,
            start: built.start,
            stores: built.stores.clone(),
            table: built.table.clone(),
        }
    }

    /// Checks that this table was computed for `mode` and for the same start
    /// and store coordinates as `resolved`, with an entry for every pair
    pub fn covers(&self, mode: TravelMode, resolved: &ResolvedWaypoints) -> bool {
        if self.mode != mode {
            debug!(cached = %self.mode, requested = %mode, "cached table is for another travel mode");
            return false;
        }
        if !same_place(&self.start, &resolved.start) {
            debug!(cached = %self.start, requested = %resolved.start, "cached table has another start");
            return false;
        }

        for (address, location) in &resolved.stores {
            let cached = self.stores.iter().find(|(a, _)| a == address);
            match cached {
                Some((_, cached_location)) if same_place(cached_location, location) => {}
                _ => {
                    debug!(store = %address, "cached table has no matching store location");
                    return false;
                }
            }
        }

        self.table.verify_complete(&resolved.addresses()).is_ok()
    }
}

fn same_place(a: &Location, b: &Location) -> bool {
    (a.lng - b.lng).abs() < LOCATION_TOLERANCE && (a.lat - b.lat).abs() < LOCATION_TOLERANCE
}

// On-disk form; `None` cost marks an unreachable pair
#[derive(Serialize, Deserialize)]
struct CostTableFile {
    mode: TravelMode,
    start: Location,
    stores: Vec<StoreLocation>,
    entries: Vec<CacheEntry>,
}

#[derive(Serialize, Deserialize)]
struct StoreLocation {
    address: String,
    location: Location,
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    from: Waypoint,
    to: Waypoint,
    cost: Option<Cost>,
}

/// Serialize a cached table to pretty JSON, entries sorted for stable output
pub fn cost_table_to_json(cached: &CachedCostTable) -> Result<String, RouterError> {
    let mut entries: Vec<CacheEntry> = cached
        .table
        .iter()
        .map(|(from, to, cost)| CacheEntry {
            from: from.clone(),
            to: to.clone(),
            cost: cost.is_finite().then_some(cost),
        })
        .collect();
    entries.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

    let file = CostTableFile {
        mode: cached.mode,
        start: cached.start,
        stores: cached
            .stores
            .iter()
            .map(|(address, location)| StoreLocation {
                address: address.clone(),
                location: *location,
            })
            .collect(),
        entries,
    };

    serde_json::to_string_pretty(&file).map_err(|e| RouterError::Cache(e.to_string()))
}

pub fn cost_table_from_json(json: &str) -> Result<CachedCostTable, RouterError> {
    let file: CostTableFile =
        serde_json::from_str(json).map_err(|e| RouterError::Cache(e.to_string()))?;

    let mut table = CostTable::new();
    for entry in file.entries {
        match entry.cost {
            Some(cost) => table.insert(&entry.from, &entry.to, cost),
            None => table.insert_unreachable(&entry.from, &entry.to),
        }
    }

    Ok(CachedCostTable {
        mode: file.mode,
        start: file.start,
        stores: file
            .stores
            .into_iter()
            .map(|s| (s.address, s.location))
            .collect(),
        table,
    })
}

/// Save a cost table so a later request over the same stores can skip the
/// routing calls
pub fn save_cost_table<P: AsRef<Path>>(cached: &CachedCostTable, path: P) -> Result<(), RouterError> {
    let json = cost_table_to_json(cached)?;
    fs::write(path.as_ref(), json).map_err(|e| RouterError::Cache(e.to_string()))?;
    info!(path = %path.as_ref().display(), entries = cached.table.len(), "cost table cached");
    Ok(())
}

/// Load a cached cost table; `Ok(None)` if no usable cache file exists
pub fn load_cost_table<P: AsRef<Path>>(path: P) -> Result<Option<CachedCostTable>, RouterError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(path).map_err(|e| RouterError::Cache(e.to_string()))?;
    match cost_table_from_json(&json) {
        Ok(cached) => {
            info!(path = %path.display(), entries = cached.table.len(), "loaded cost table from cache");
            Ok(Some(cached))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable cost table cache");
            Ok(None)
        }
    }
}
