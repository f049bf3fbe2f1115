//! Solution representation for the route planner.
//!
//! [`TourSolution`] is what the optimizer hands to the assembler,
//! [`AssembledRoute`] what the assembler produces and [`TripReport`] the
//! serialized answer returned to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::exact::SolveStatus;
use crate::geo::Step;
use crate::instance::Objective;

/// Arcs chosen by the solver, as 0-based `(from, to)` pairs sorted row-major
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcSelection {
    arcs: Vec<(usize, usize)>,
}

impl ArcSelection {
    pub fn new(mut arcs: Vec<(usize, usize)>) -> Self {
        arcs.sort_unstable();
        arcs.dedup();
        ArcSelection { arcs }
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn contains(&self, from: usize, to: usize) -> bool {
        self.arcs.binary_search(&(from, to)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.arcs.iter().copied()
    }

    /// All selected successors of `node`
    pub fn successors(&self, node: usize) -> Vec<usize> {
        self.arcs
            .iter()
            .filter(|(from, _)| *from == node)
            .map(|&(_, to)| to)
            .collect()
    }
}

/// Output of the route optimizer
#[derive(Debug, Clone, PartialEq)]
pub struct TourSolution {
    pub status: SolveStatus,
    pub objective: Objective,
    /// Selected arcs; empty unless `status` is optimal
    pub arcs: ArcSelection,
    /// Objective value: summed miles for distance, bottleneck seconds for time
    pub total_cost: Option<f64>,
}

impl TourSolution {
    /// Solution carrying only a non-optimal status
    pub fn without_tour(status: SolveStatus, objective: Objective) -> Self {
        TourSolution {
            status,
            objective,
            arcs: ArcSelection::default(),
            total_cost: None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }
}

impl fmt::Display for TourSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tour ({} objective)", self.objective)?;
        writeln!(f, "  Status: {}", self.status)?;
        if let Some(cost) = self.total_cost {
            writeln!(f, "  Cost: {:.2}", cost)?;
        }
        writeln!(f, "  Arcs: {:?}", self.arcs.arcs)
    }
}

/// One leg of the assembled round trip
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    /// `None` when the directions lookup for this leg failed
    pub directions: Option<Vec<Step>>,
}

/// Output of the route assembler
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledRoute {
    /// Visiting order as 0-based indices, starting and ending at the depot
    pub tour: Vec<usize>,
    pub legs: Vec<RouteLeg>,
    pub map_url: Option<String>,
}

impl AssembledRoute {
    /// The `(from, to)` address pairs in visiting order
    pub fn ordered_path(&self) -> Vec<(String, String)> {
        self.legs
            .iter()
            .map(|leg| (leg.from.clone(), leg.to.clone()))
            .collect()
    }
}

/// Response returned for a trip planning request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripReport {
    pub status: SolveStatus,
    /// Miles, 2 decimals
    pub total_distance: Option<f64>,
    /// Hours, 2 decimals
    pub total_duration: Option<f64>,
    pub estimated_fuel_cost: Option<f64>,
    pub ordered_path: Vec<(String, String)>,
    pub turn_by_turn_directions: Vec<Option<Vec<(String, String)>>>,
    pub map_url: Option<String>,
}

impl TripReport {
    /// Report for a solve that did not reach optimality: no path and no totals
    pub fn without_route(status: SolveStatus) -> Self {
        TripReport {
            status,
            total_distance: None,
            total_duration: None,
            estimated_fuel_cost: None,
            ordered_path: Vec::new(),
            turn_by_turn_directions: Vec::new(),
            map_url: None,
        }
    }
}

impl fmt::Display for TripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        if let (Some(d), Some(t), Some(c)) =
            (self.total_distance, self.total_duration, self.estimated_fuel_cost)
        {
            writeln!(f, "  Distance: {:.2} mi", d)?;
            writeln!(f, "  Duration: {:.2} h", t)?;
            writeln!(f, "  Fuel cost: {:.2}", c)?;
        }
        for (i, (from, to)) in self.ordered_path.iter().enumerate() {
            writeln!(f, "  {}. {} -> {}", i + 1, from, to)?;
        }
        if let Some(url) = &self.map_url {
            writeln!(f, "  Map: {}", url)?;
        }
        Ok(())
    }
}
