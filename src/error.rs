//! Error types for geocoding, routing and route planning.
//!
//! Provider failures (`GeocodeError`, `RoutingError`) are split into transient
//! and permanent kinds so the retry wrapper knows which ones are worth another
//! attempt. `RouterError` is what callers of the planner see.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::models::{Item, Waypoint};

/// An address could not be turned into coordinates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// The service answered but had no result for the address.
    #[error("no geocoding result for address '{address}'")]
    NotFound { address: String },

    /// The service answered with a non-success status.
    #[error("geocoding '{address}' failed with status {status}")]
    Status { address: String, status: String },

    /// The service could not be reached.
    #[error("geocoding service unavailable for '{address}': {message}")]
    Unavailable { address: String, message: String },

    /// The call did not finish within the configured timeout.
    #[error("geocoding '{address}' timed out")]
    Timeout { address: String },
}

impl GeocodeError {
    /// Address the failure refers to.
    pub fn address(&self) -> &str {
        match self {
            GeocodeError::NotFound { address }
            | GeocodeError::Status { address, .. }
            | GeocodeError::Unavailable { address, .. }
            | GeocodeError::Timeout { address } => address,
        }
    }

    /// Returns true if another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeocodeError::Unavailable { .. } | GeocodeError::Timeout { .. }
        )
    }
}

/// No travel distance could be obtained between two locations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// The routing service found no route between the points.
    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },

    /// The routing service could not be reached.
    #[error("routing service unavailable ({from} -> {to}): {message}")]
    Unavailable {
        from: String,
        to: String,
        message: String,
    },

    /// The call did not finish within the configured timeout.
    #[error("routing {from} -> {to} timed out")]
    Timeout { from: String, to: String },
}

impl RoutingError {
    /// Returns true if another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RoutingError::Unavailable { .. } | RoutingError::Timeout { .. }
        )
    }

    /// Endpoints of the failed query.
    pub fn endpoints(&self) -> (&str, &str) {
        match self {
            RoutingError::NoRoute { from, to }
            | RoutingError::Unavailable { from, to, .. }
            | RoutingError::Timeout { from, to } => (from.as_str(), to.as_str()),
        }
    }
}

/// Errors surfaced by the route planner.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// The stores left cannot supply every requested item.
    #[error("cannot cover items: {}", join_items(.remaining_items))]
    UnsatisfiableCoverage { remaining_items: BTreeSet<Item> },

    /// The cost table has no entry for a pair the router needs.
    #[error("cost table has no entry for {from} <-> {to}")]
    IncompleteCostTable { from: Waypoint, to: Waypoint },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("route planning was cancelled")]
    Cancelled,

    #[error("could not start worker pool: {0}")]
    WorkerPool(String),

    #[error("cost table cache error: {0}")]
    Cache(String),
}

fn join_items(items: &BTreeSet<Item>) -> String {
    items
        .iter()
        .map(Item::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
