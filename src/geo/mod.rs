//! Geospatial lookups: geocoding, driving directions and map URLs.
//!
//! [`GeoService`] is the seam between the planner and the outside world. The
//! production implementation talks to Google Maps ([`google::GoogleMapsClient`]);
//! [`memo::MemoizedGeo`] wraps any implementation so that a single request
//! never issues the same lookup twice.

pub mod google;
pub mod memo;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use google::GoogleMapsClient;
pub use memo::MemoizedGeo;

/// Conversion factor used for the reported mileage
pub const METERS_TO_MILES: f64 = 0.000621371;

/// A resolved (latitude, longitude) pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinates { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// One turn-by-turn instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Instruction text as returned by the directions service (may contain HTML)
    pub instruction: String,
    /// Human readable distance, e.g. "0.3 mi"
    pub distance_text: String,
}

impl Step {
    pub fn new(instruction: impl Into<String>, distance_text: impl Into<String>) -> Self {
        Step {
            instruction: instruction.into(),
            distance_text: distance_text.into(),
        }
    }

    /// The `[instruction, distance]` pair used in responses.
    pub fn into_pair(self) -> (String, String) {
        (self.instruction, self.distance_text)
    }
}

/// Everything one directions lookup yields for an origin/destination pair
#[derive(Debug, Clone, PartialEq)]
pub struct Directions {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub steps: Vec<Step>,
}

impl Directions {
    pub fn distance_miles(&self) -> f64 {
        self.distance_meters * METERS_TO_MILES
    }
}

/// Geocoding and routing capability.
///
/// "Not found" is never an error: implementations log the failure and return
/// `None`, and transport failures are folded into the same outcome.
pub trait GeoService {
    /// Resolve an address to coordinates.
    fn geocode(&self, address: &str) -> Option<Coordinates>;

    /// Driving directions for a single origin/destination pair.
    fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions>;

    /// Embeddable round-trip map starting and ending at `origin`.
    fn embed_map_url(&self, origin: Coordinates, waypoints: &[Coordinates]) -> String;

    /// Driving distance in miles and duration in seconds.
    fn route_metrics(&self, origin: Coordinates, destination: Coordinates) -> Option<(f64, f64)> {
        self.directions(origin, destination)
            .map(|d| (d.distance_miles(), d.duration_seconds))
    }

    /// Ordered `(instruction, distance)` steps between two points.
    fn turn_by_turn(&self, origin: Coordinates, destination: Coordinates) -> Option<Vec<Step>> {
        self.directions(origin, destination).map(|d| d.steps)
    }

    /// Geocode every address in order and build one map URL whose origin and
    /// destination are the first address, the rest being waypoints.
    ///
    /// Addresses that fail to geocode are skipped; `None` when none resolve.
    fn build_overview_map_url(&self, ordered_addresses: &[String]) -> Option<String> {
        let coords: Vec<Coordinates> = ordered_addresses
            .iter()
            .filter_map(|address| self.geocode(address))
            .collect();
        let (origin, waypoints) = coords.split_first()?;
        Some(self.embed_map_url(*origin, waypoints))
    }
}

impl<G: GeoService + ?Sized> GeoService for &G {
    fn geocode(&self, address: &str) -> Option<Coordinates> {
        (**self).geocode(address)
    }

    fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions> {
        (**self).directions(origin, destination)
    }

    fn embed_map_url(&self, origin: Coordinates, waypoints: &[Coordinates]) -> String {
        (**self).embed_map_url(origin, waypoints)
    }
}
