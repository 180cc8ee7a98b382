//! Keyed single-flight guard with request coalescing.
//!
//! At most one request per key is in flight. A request arriving while its key
//! is busy is parked as the pending request; a newer arrival replaces the
//! parked one. The leader drains the pending slot when it finishes.
//!
//! The lock is only held for map bookkeeping and never across an await.
//!
//! Async leaders should go through [`SingleFlight::lead`]: the returned
//! [`FlightGuard`] ends the flight when dropped, so a leader future that is
//! cancelled mid-request does not leave its key busy forever.

#[cfg(test)]
#[path = "flight_test.rs"]
mod flight_test;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

#[derive(Debug)]
pub struct SingleFlight<K, T> {
    flights: Mutex<HashMap<K, Option<T>>>,
}

impl<K: Eq + Hash, T> SingleFlight<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self { flights: Mutex::new(HashMap::new()) }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Option<T>>> {
        self.flights.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a flight for `key`. Returns the request back when the caller
    /// becomes the leader; returns `None` when it was parked behind an
    /// in-flight request.
    pub fn try_begin(&self, key: K, request: T) -> Option<T> {
        let mut flights = self.lock();
        if let Some(pending) = flights.get_mut(&key) {
            *pending = Some(request);
            return None;
        }
        flights.insert(key, None);
        Some(request)
    }

    /// Like [`Self::try_begin`], but the leader also gets a guard that owns
    /// the flight until it is drained, abandoned, or dropped.
    pub fn lead(&self, key: K, request: T) -> Option<(FlightGuard<'_, K, T>, T)>
    where
        K: Clone,
    {
        let request = self.try_begin(key.clone(), request)?;
        Some((FlightGuard { flights: self, key: Some(key) }, request))
    }

    /// Take the parked request for `key`, or end the flight if there is none.
    pub fn next(&self, key: &K) -> Option<T> {
        let mut flights = self.lock();
        let pending = flights.get_mut(key).and_then(Option::take);
        if pending.is_none() {
            flights.remove(key);
        }
        pending
    }

    /// Move an in-flight entry to a new key, keeping its parked request.
    pub fn rekey(&self, from: &K, to: K) {
        let mut flights = self.lock();
        let pending = flights.remove(from).flatten();
        let slot = flights.entry(to).or_insert(None);
        if pending.is_some() {
            *slot = pending;
        }
    }

    /// End the flight for `key`, returning any parked request that is dropped.
    pub fn abandon(&self, key: &K) -> Option<T> {
        self.lock().remove(key).flatten()
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    #[must_use]
    pub fn has_pending(&self, key: &K) -> bool {
        self.lock().get(key).is_some_and(Option::is_some)
    }
}

impl<K: Eq + Hash, T> Default for SingleFlight<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// GUARD
// =============================================================================

/// Leadership of one flight. Dropping it while still armed abandons the
/// flight and any parked request.
#[derive(Debug)]
pub struct FlightGuard<'a, K: Eq + Hash, T> {
    flights: &'a SingleFlight<K, T>,
    key: Option<K>,
}

impl<K: Eq + Hash + Clone, T> FlightGuard<'_, K, T> {
    /// Key the flight currently runs under; `None` once it has ended.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// Move the flight to `to`, keeping any parked request.
    pub fn rekey(&mut self, to: K) {
        if let Some(from) = self.key.take() {
            self.flights.rekey(&from, to.clone());
            self.key = Some(to);
        }
    }

    /// Take the parked request. Ends the flight and disarms the guard when
    /// nothing is parked.
    pub fn next(&mut self) -> Option<T> {
        let key = self.key.as_ref()?;
        let pending = self.flights.next(key);
        if pending.is_none() {
            self.key = None;
        }
        pending
    }

    /// End the flight now, returning any parked request that is dropped.
    pub fn abandon(mut self) -> Option<T> {
        let key = self.key.take()?;
        self.flights.abandon(&key)
    }
}

impl<K: Eq + Hash, T> Drop for FlightGuard<'_, K, T> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let dropped = self.flights.abandon(&key).is_some();
            warn!(dropped_pending = dropped, "flight released before completion");
        }
    }
}
