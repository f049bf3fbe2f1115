//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use route_planner::geo::{Coordinates, Directions, GeoService, Step};

/// Meters per position unit along the fake road
pub const UNIT_METERS: f64 = 10_000.0;
/// Seconds per position unit along the fake road
pub const UNIT_SECONDS: f64 = 600.0;

/// Addresses laid out on a straight road. Driving between two of them covers
/// the gap in positions; unknown addresses do not geocode.
pub struct RoadGeo {
    positions: HashMap<String, f64>,
    pub geocode_calls: AtomicUsize,
    pub directions_calls: AtomicUsize,
}

impl RoadGeo {
    pub fn new(stops: &[(&str, f64)]) -> Self {
        RoadGeo {
            positions: stops
                .iter()
                .map(|(address, pos)| (address.to_string(), *pos))
                .collect(),
            geocode_calls: AtomicUsize::new(0),
            directions_calls: AtomicUsize::new(0),
        }
    }

    pub fn geocodes(&self) -> usize {
        self.geocode_calls.load(Ordering::SeqCst)
    }

    pub fn directions_lookups(&self) -> usize {
        self.directions_calls.load(Ordering::SeqCst)
    }
}

impl GeoService for RoadGeo {
    fn geocode(&self, address: &str) -> Option<Coordinates> {
        self.geocode_calls.fetch_add(1, Ordering::SeqCst);
        self.positions.get(address).map(|pos| Coordinates::new(*pos, 0.0))
    }

    fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions> {
        self.directions_calls.fetch_add(1, Ordering::SeqCst);
        let gap = (destination.lat - origin.lat).abs();
        Some(Directions {
            distance_meters: gap * UNIT_METERS,
            duration_seconds: gap * UNIT_SECONDS,
            steps: vec![
                Step::new(format!("Head along the road from {}", origin.lat), "1 ft"),
                Step::new(format!("Arrive at {}", destination.lat), format!("{} km", gap * 10.0)),
            ],
        })
    }

    fn embed_map_url(&self, origin: Coordinates, waypoints: &[Coordinates]) -> String {
        let stops: Vec<String> = waypoints.iter().map(|c| c.to_string()).collect();
        format!("https://maps.test/embed?origin={}&waypoints={}", origin, stops.join("|"))
    }
}

/// A, C, D, B at positions 0, 1, 2, 3: the best loop runs out to B and back
pub fn road() -> RoadGeo {
    RoadGeo::new(&[("A", 0.0), ("B", 3.0), ("C", 1.0), ("D", 2.0)])
}
