//! Turns the optimizer's arc selection into an ordered round trip.
//!
//! Starting at the depot, the unique selected outgoing arc is followed until
//! the depot is reached again. Each step becomes a leg annotated with its
//! turn-by-turn directions, and the stops in visiting order become one map URL.
//!
//! The walk only makes sense on the output of an optimal solve; anything other
//! than a single cycle through every location is a [`PlannerError::Consistency`].

use log::{debug, error};

use crate::error::{PlannerError, Result};
use crate::geo::GeoService;
use crate::instance::Location;
use crate::solution::{ArcSelection, AssembledRoute, RouteLeg};

/// Visiting order encoded by `arcs`, starting and ending at `depot`.
pub fn extract_cycle(depot: usize, arcs: &ArcSelection, n: usize) -> Result<Vec<usize>> {
    if depot >= n {
        return Err(consistency(format!(
            "depot index {} outside of {} locations",
            depot, n
        )));
    }

    let mut tour = Vec::with_capacity(n + 1);
    let mut visited = vec![false; n];
    tour.push(depot);
    visited[depot] = true;

    let mut current = depot;
    for step in 1..=n {
        let next = match arcs.successors(current).as_slice() {
            [next] => *next,
            [] => {
                return Err(consistency(format!(
                    "location {} has no selected outgoing arc",
                    current + 1
                )))
            }
            many => {
                return Err(consistency(format!(
                    "location {} has {} selected outgoing arcs",
                    current + 1,
                    many.len()
                )))
            }
        };

        if next >= n {
            return Err(consistency(format!("arc leads to unknown location index {}", next)));
        }

        if next == depot {
            if step != n {
                return Err(consistency(format!(
                    "tour returns to the depot after {} of {} legs",
                    step, n
                )));
            }
            tour.push(depot);
            return Ok(tour);
        }

        if visited[next] {
            return Err(consistency(format!(
                "location {} is visited twice",
                next + 1
            )));
        }
        visited[next] = true;
        tour.push(next);
        current = next;
    }

    Err(consistency(format!(
        "tour does not return to the depot within {} legs",
        n
    )))
}

fn consistency(message: String) -> PlannerError {
    error!("Optimizer/assembler contract violated: {}", message);
    PlannerError::Consistency(message)
}

/// Build the ordered legs, their directions and the overview map.
pub fn assemble<G: GeoService + ?Sized>(
    depot: usize,
    arcs: &ArcSelection,
    locations: &[Location],
    geo: &G,
) -> Result<AssembledRoute> {
    let tour = extract_cycle(depot, arcs, locations.len())?;

    let legs: Vec<RouteLeg> = tour
        .windows(2)
        .map(|w| {
            let (from, to) = (&locations[w[0]], &locations[w[1]]);
            let directions = match (from.coords, to.coords) {
                (Some(origin), Some(destination)) => geo.turn_by_turn(origin, destination),
                _ => None,
            };
            debug!(
                "Leg {} -> {}: {} steps",
                from.id,
                to.id,
                directions.as_ref().map_or(0, |d| d.len())
            );
            RouteLeg {
                from: from.address.clone(),
                to: to.address.clone(),
                directions,
            }
        })
        .collect();

    let stops: Vec<String> = legs.iter().map(|leg| leg.from.clone()).collect();
    let map_url = geo.build_overview_map_url(&stops);

    Ok(AssembledRoute { tour, legs, map_url })
}
