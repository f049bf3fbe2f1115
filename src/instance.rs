//! Module for representing a routing instance.
//!
//! An instance is the list of locations to visit (location 1 is the depot,
//! where the round trip starts and ends) together with the pairwise driving
//! distance and duration between them.

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geo::{Coordinates, GeoService};

/// Represents a location in the instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Location identifier (1-based, 1 = depot)
    pub id: usize,
    /// Address as entered by the user
    pub address: String,
    /// Resolved coordinates, `None` if geocoding failed
    pub coords: Option<Coordinates>,
}

impl Location {
    pub fn new(id: usize, address: impl Into<String>, coords: Option<Coordinates>) -> Self {
        Location {
            id,
            address: address.into(),
            coords,
        }
    }

    /// Geocode `address` and wrap the outcome
    pub fn resolve<G: GeoService + ?Sized>(id: usize, address: &str, geo: &G) -> Self {
        Location::new(id, address, geo.geocode(address))
    }
}

/// Quantity the tour is optimized for
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Total driving distance
    Distance,
    /// Driving time (form value `time`)
    #[serde(rename = "time")]
    Duration,
}

impl FromStr for Objective {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "distance" => Ok(Objective::Distance),
            "time" => Ok(Objective::Duration),
            other => Err(format!(
                "unknown minimize choice '{}', expected 'time' or 'distance'",
                other
            )),
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Objective::Distance => write!(f, "distance"),
            Objective::Duration => write!(f, "time"),
        }
    }
}

/// Driving metrics of one arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub distance_miles: f64,
    pub duration_seconds: f64,
}

impl Leg {
    pub fn new(distance_miles: f64, duration_seconds: f64) -> Self {
        Leg {
            distance_miles,
            duration_seconds,
        }
    }

    /// Cost of this arc under the given objective
    #[inline]
    pub fn cost(&self, objective: Objective) -> f64 {
        match objective {
            Objective::Distance => self.distance_miles,
            Objective::Duration => self.duration_seconds,
        }
    }
}

/// Pairwise travel metrics, indexed 0-based (index 0 is the depot).
///
/// A `None` entry means the lookup for that ordered pair failed; such an arc
/// is left out of the optimization model entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    legs: Vec<Vec<Option<Leg>>>,
}

impl TravelMatrix {
    /// Wrap a square matrix of legs; the diagonal is ignored
    pub fn from_legs(mut legs: Vec<Vec<Option<Leg>>>) -> Result<Self, String> {
        let n = legs.len();
        if let Some(row) = legs.iter().position(|r| r.len() != n) {
            return Err(format!(
                "travel matrix is not square: row {} has {} entries, expected {}",
                row,
                legs[row].len(),
                n
            ));
        }
        for (i, row) in legs.iter_mut().enumerate() {
            row[i] = None;
        }
        Ok(TravelMatrix { legs })
    }

    /// Look up every ordered pair of resolved locations.
    ///
    /// Lookups are independent and run in parallel; pairs involving a location
    /// without coordinates are missing without a lookup.
    pub fn build<G: GeoService + Sync + ?Sized>(locations: &[Location], geo: &G) -> Self {
        let n = locations.len();
        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();

        let fetched: Vec<((usize, usize), Option<Leg>)> = pairs
            .into_par_iter()
            .map(|(i, j)| {
                let leg = match (locations[i].coords, locations[j].coords) {
                    (Some(origin), Some(destination)) => geo
                        .route_metrics(origin, destination)
                        .map(|(miles, secs)| Leg::new(miles, secs)),
                    _ => None,
                };
                ((i, j), leg)
            })
            .collect();

        let mut legs = vec![vec![None; n]; n];
        for ((i, j), leg) in fetched {
            match leg {
                Some(leg) => debug!(
                    "Arc {} -> {}: {:.2} mi, {:.0} s",
                    locations[i].id, locations[j].id, leg.distance_miles, leg.duration_seconds
                ),
                None => warn!(
                    "No driving route from location {} to {}; arc excluded",
                    locations[i].id, locations[j].id
                ),
            }
            legs[i][j] = leg;
        }

        TravelMatrix { legs }
    }

    /// Number of locations
    #[inline]
    pub fn dimension(&self) -> usize {
        self.legs.len()
    }

    #[inline]
    pub fn leg(&self, i: usize, j: usize) -> Option<&Leg> {
        self.legs.get(i)?.get(j)?.as_ref()
    }

    /// Get the distance between two locations in miles
    pub fn distance(&self, i: usize, j: usize) -> Option<f64> {
        self.leg(i, j).map(|l| l.distance_miles)
    }

    /// Get the driving time between two locations in seconds
    pub fn duration(&self, i: usize, j: usize) -> Option<f64> {
        self.leg(i, j).map(|l| l.duration_seconds)
    }

    /// All usable arcs `(i, j, leg)` in row-major order
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize, &Leg)> + '_ {
        self.legs.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(j, leg)| leg.as_ref().map(|l| (i, j, l)))
        })
    }

    /// Number of ordered pairs without a usable leg
    pub fn missing_arcs(&self) -> usize {
        let n = self.dimension();
        n * n.saturating_sub(1) - self.arcs().count()
    }

    /// Locations that cannot be both entered and left: no tour can exist
    pub fn isolated_nodes(&self) -> Vec<usize> {
        let n = self.dimension();
        (0..n)
            .filter(|&v| {
                let has_out = (0..n).any(|j| self.leg(v, j).is_some());
                let has_in = (0..n).any(|i| self.leg(i, v).is_some());
                !(has_out && has_in)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Directions;

    #[test]
    fn test_objective_parsing() {
        assert_eq!("time".parse::<Objective>().unwrap(), Objective::Duration);
        assert_eq!("distance".parse::<Objective>().unwrap(), Objective::Distance);
        assert_eq!(" distance ".parse::<Objective>().unwrap(), Objective::Distance);
        assert!("speed".parse::<Objective>().is_err());
        assert_eq!(Objective::Duration.to_string(), "time");
    }

    #[test]
    fn test_from_legs_rejects_ragged() {
        let legs = vec![vec![None, None], vec![None]];
        assert!(TravelMatrix::from_legs(legs).is_err());
    }

    #[test]
    fn test_isolated_nodes() {
        let l = Some(Leg::new(1.0, 1.0));
        let legs = vec![
            vec![None, l, l],
            vec![l, None, None],
            vec![None, None, None],
        ];
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        assert_eq!(matrix.isolated_nodes(), vec![2]);
    }

    struct Grid;

    impl GeoService for Grid {
        fn geocode(&self, _address: &str) -> Option<Coordinates> {
            None
        }

        fn directions(&self, origin: Coordinates, destination: Coordinates) -> Option<Directions> {
            let meters = ((origin.lat - destination.lat).abs() + (origin.lng - destination.lng).abs()) * 1000.0;
            Some(Directions {
                distance_meters: meters,
                duration_seconds: meters / 10.0,
                steps: Vec::new(),
            })
        }

        fn embed_map_url(&self, _origin: Coordinates, _waypoints: &[Coordinates]) -> String {
            String::new()
        }
    }

    #[test]
    fn test_build_skips_unresolved_locations() {
        let locations = vec![
            Location::new(1, "depot", Some(Coordinates::new(0.0, 0.0))),
            Location::new(2, "stop", Some(Coordinates::new(1.0, 0.0))),
            Location::new(3, "lost", None),
        ];
        let matrix = TravelMatrix::build(&locations, &Grid);

        assert_eq!(matrix.dimension(), 3);
        assert_eq!(matrix.duration(0, 1), Some(100.0));
        assert_eq!(matrix.duration(1, 0), Some(100.0));
        assert!(matrix.leg(0, 2).is_none());
        assert!(matrix.leg(2, 1).is_none());
        assert_eq!(matrix.isolated_nodes(), vec![2]);
    }
}
