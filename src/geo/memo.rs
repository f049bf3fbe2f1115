//! Request-scoped memoization of geospatial lookups.
//!
//! The pipeline asks for the same data several times: the matrix needs the
//! distance and duration of every pair, the assembler the steps of the chosen
//! legs, and the map URL the coordinates of every stop. Wrapping the service
//! in a [`MemoizedGeo`] for the lifetime of one request turns all of that into
//! one directions call per ordered pair and one geocode per address.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Coordinates, Directions, GeoService};

type PairKey = (u64, u64, u64, u64);

fn pair_key(origin: Coordinates, destination: Coordinates) -> PairKey {
    (
        origin.lat.to_bits(),
        origin.lng.to_bits(),
        destination.lat.to_bits(),
        destination.lng.to_bits(),
    )
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves a cache that is still valid
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct MemoizedGeo<G> {
    inner: G,
    geocodes: Mutex<HashMap<String, Option<Coordinates>>>,
    directions: Mutex<HashMap<PairKey, Option<Directions>>>,
}

impl<G: GeoService> MemoizedGeo<G> {
    pub fn new(inner: G) -> Self {
        MemoizedGeo {
            inner,
            geocodes: Mutex::new(HashMap::new()),
            directions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct addresses looked up so far
    pub fn geocoded_count(&self) -> usize {
        lock(&self.geocodes).len()
    }

    /// Number of distinct origin/destination pairs looked up so far
    pub fn directions_count(&self) -> usize {
        lock(&self.directions).len()
    }
}

impl<G: GeoService> GeoService for MemoizedGeo<G> {
    fn geocode(&self, address: &str) -> Option<Coordinates> {
        if let Some(hit) = lock(&self.geocodes).get(address) {
            return *hit;
        }
        // Lock released during the lookup so parallel callers are not serialized
        let coords = self.inner.geocode(address);
        lock(&self.geocodes).insert(address.to_string(), coords);
        coords
    }

    fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions> {
        let key = pair_key(origin, destination);
        if let Some(hit) = lock(&self.directions).get(&key) {
            return hit.clone();
        }
        let directions = self.inner.directions(origin, destination);
        lock(&self.directions).insert(key, directions.clone());
        directions
    }

    fn embed_map_url(&self, origin: Coordinates, waypoints: &[Coordinates]) -> String {
        self.inner.embed_map_url(origin, waypoints)
    }
}
