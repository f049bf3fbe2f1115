//! Error type shared by the planning pipeline and its front ends.

use thiserror::Error;

/// Errors surfaced by the route planner.
///
/// Lookup failures (address not found, no route) are not errors: they are
/// carried as missing values and end up as an infeasible solver status.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Request rejected at the boundary, before any lookup is issued
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The MILP backend could not be built or run
    #[error("solver failure: {0}")]
    Solver(String),

    /// The optimizer and assembler disagree about the shape of the tour
    #[error("internal consistency error: {0}")]
    Consistency(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PlannerError {
    /// Whether the caller is at fault (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PlannerError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
