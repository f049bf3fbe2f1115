//! Exact solvers module.
//!
//! The optimizer only sees the [`MilpSolver`] capability: hand it a
//! [`MilpModel`], get back a terminal status and a value per variable.
//! The pure-Rust microlp backend is always available; the Gurobi backend is
//! compiled in with the `gurobi` feature.

pub mod model;
pub mod microlp;

#[cfg(feature = "gurobi")]
pub mod gurobi;

pub use model::{LinearConstraint, MilpModel, Sense, VarId, VarKind, VarSpec};
pub use self::microlp::MicrolpSolver;

#[cfg(feature = "gurobi")]
pub use gurobi::GurobiSolver;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SolverConfig;

/// Terminal state reported by a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    #[serde(rename = "Not Solved")]
    NotSolved,
    Undefined,
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        *self == SolveStatus::Optimal
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::Unbounded => "Unbounded",
            SolveStatus::NotSolved => "Not Solved",
            SolveStatus::Undefined => "Undefined",
        };
        f.write_str(s)
    }
}

/// Result of exact solving
#[derive(Debug, Clone, PartialEq)]
pub struct MilpOutcome {
    pub status: SolveStatus,
    /// One value per model variable; empty unless a solution exists
    pub values: Vec<f64>,
    /// Objective value of `values`
    pub objective: Option<f64>,
}

impl MilpOutcome {
    /// Outcome without a solution
    pub fn without_solution(status: SolveStatus) -> Self {
        MilpOutcome {
            status,
            values: Vec::new(),
            objective: None,
        }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.0).copied()
    }
}

/// A MILP backend.
///
/// `Err` is reserved for failures of the backend itself (license, environment);
/// infeasible or unbounded models are reported through [`MilpOutcome::status`].
pub trait MilpSolver {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> Result<MilpOutcome, String>;
}

/// Backend selected at compile time: Gurobi when the `gurobi` feature is
/// enabled, microlp otherwise
pub fn default_solver(config: &SolverConfig) -> Box<dyn MilpSolver + Send + Sync> {
    #[cfg(feature = "gurobi")]
    {
        Box::new(GurobiSolver::new(config.clone()))
    }
    #[cfg(not(feature = "gurobi"))]
    {
        Box::new(MicrolpSolver::new(config.clone()))
    }
}
