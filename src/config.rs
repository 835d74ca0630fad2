//! Router configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::oracle::TravelMode;

/// What to do with a store whose address cannot be geocoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeocodePolicy {
    /// Fail the whole request
    #[default]
    Abort,
    /// Drop the store and route with the rest
    SkipStore,
}

/// Route planner configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Travel mode passed to the distance provider
    pub travel_mode: TravelMode,

    /// Threads used for cost-table queries (0 = one per core)
    pub worker_threads: usize,

    /// Per-call timeout for external lookups in milliseconds (0 = no timeout)
    pub request_timeout_ms: u64,

    /// Extra attempts after a transient provider failure
    pub max_retries: u32,

    /// Handling of stores that cannot be geocoded
    pub geocode_policy: GeocodePolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::Driving,
            worker_threads: 4,
            request_timeout_ms: 10_000,
            max_retries: 1,
            geocode_policy: GeocodePolicy::Abort,
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup; missing keys keep
    /// their default values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = RouterConfig {
            travel_mode: match lookup("ROUTER_TRAVEL_MODE") {
                Some(value) => value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("ROUTER_TRAVEL_MODE".to_string()))?,
                None => defaults.travel_mode,
            },

            worker_threads: parse_or("ROUTER_WORKER_THREADS", &lookup, defaults.worker_threads)?,

            request_timeout_ms: parse_or(
                "ROUTER_REQUEST_TIMEOUT_MS",
                &lookup,
                defaults.request_timeout_ms,
            )?,

            max_retries: parse_or("ROUTER_MAX_RETRIES", &lookup, defaults.max_retries)?,

            geocode_policy: match lookup("ROUTER_GEOCODE_POLICY").as_deref().map(str::trim) {
                None => defaults.geocode_policy,
                Some("abort") => GeocodePolicy::Abort,
                Some("skip") | Some("skip_store") => GeocodePolicy::SkipStore,
                Some(_) => {
                    return Err(ConfigError::InvalidValue(
                        "ROUTER_GEOCODE_POLICY".to_string(),
                    ))
                }
            },
        };

        Ok(config)
    }

    /// Per-call timeout, or `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
