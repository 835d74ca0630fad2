//! Timeout and retry wrapper around geocoding and distance providers.
//!
//! Each call runs on a helper thread and the result is awaited with
//! `recv_timeout`. A call that misses the deadline is reported as a
//! `Timeout` error and its thread is left to finish on its own. Only
//! transient failures (timeouts, unavailable service) are retried.

use std::fmt::Display;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::{GeocodeError, RoutingError};
use crate::models::{Cost, Location};
use crate::oracle::{DistanceProvider, Geocoder, TravelMode};

/// Why a guarded call produced no result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallFailure {
    TimedOut,
    /// The worker thread went away without answering (it panicked)
    Aborted,
}

/// Wraps a provider with a per-call timeout and a retry budget.
///
/// With a timeout set, every attempt runs on its own thread. A timed-out
/// attempt leaves its thread running until the provider call returns, so one
/// table build can have at most `pairs * (max_retries + 1)` such threads
/// outstanding. Providers should enforce their own I/O deadlines to keep
/// that number near zero.
#[derive(Debug)]
pub struct Resilient<P> {
    inner: Arc<P>,
    timeout: Option<Duration>,
    max_retries: u32,
}

impl<P> Clone for Resilient<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
            max_retries: self.max_retries,
        }
    }
}

impl<P> Resilient<P> {
    /// `timeout` of `None` runs calls inline without a deadline
    pub fn new(inner: P, timeout: Option<Duration>, max_retries: u32) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
            max_retries,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

fn call_with_timeout<T, E, F>(timeout: Option<Duration>, call: F) -> Result<Result<T, E>, CallFailure>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let Some(timeout) = timeout else {
        return Ok(call());
    };

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver may already have given up
        let _ = tx.send(call());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => Ok(result),
        Err(RecvTimeoutError::Timeout) => Err(CallFailure::TimedOut),
        Err(RecvTimeoutError::Disconnected) => Err(CallFailure::Aborted),
    }
}

fn with_retries<T, E, F>(max_retries: u32, is_transient: fn(&E) -> bool, mut attempt: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let mut retries = 0;
    loop {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(err) if retries < max_retries && is_transient(&err) => {
                retries += 1;
                warn!(attempt = retries, error = %err, "retrying provider call");
            }
            Err(err) => return Err(err),
        }
    }
}

impl<P: Geocoder + 'static> Geocoder for Resilient<P> {
    fn resolve(&self, address: &str) -> Result<Location, GeocodeError> {
        with_retries(self.max_retries, GeocodeError::is_transient, || {
            let inner = Arc::clone(&self.inner);
            let owned = address.to_string();
            call_with_timeout(self.timeout, move || inner.resolve(&owned)).unwrap_or_else(
                |failure| {
                    Err(match failure {
                        CallFailure::TimedOut => GeocodeError::Timeout {
                            address: address.to_string(),
                        },
                        CallFailure::Aborted => GeocodeError::Unavailable {
                            address: address.to_string(),
                            message: "geocoder aborted".to_string(),
                        },
                    })
                },
            )
        })
    }
}

impl<P: DistanceProvider + 'static> DistanceProvider for Resilient<P> {
    fn route_cost(
        &self,
        from: &Location,
        to: &Location,
        mode: TravelMode,
    ) -> Result<Cost, RoutingError> {
        with_retries(self.max_retries, RoutingError::is_transient, || {
            let inner = Arc::clone(&self.inner);
            let (a, b) = (*from, *to);
            call_with_timeout(self.timeout, move || inner.route_cost(&a, &b, mode)).unwrap_or_else(
                |failure| {
                    Err(match failure {
                        CallFailure::TimedOut => RoutingError::Timeout {
                            from: from.to_string(),
                            to: to.to_string(),
                        },
                        CallFailure::Aborted => RoutingError::Unavailable {
                            from: from.to_string(),
                            to: to.to_string(),
                            message: "distance provider aborted".to_string(),
                        },
                    })
                },
            )
        })
    }
}
