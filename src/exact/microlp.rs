//! Pure-Rust MILP backend: `good_lp` modelling on top of the microlp
//! branch-and-bound solver.

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use log::{debug, warn};

use super::{MilpModel, MilpOutcome, MilpSolver, Sense, SolveStatus, VarId, VarKind};
use crate::config::SolverConfig;

pub struct MicrolpSolver {
    config: SolverConfig,
}

impl MicrolpSolver {
    pub fn new(config: SolverConfig) -> Self {
        MicrolpSolver { config }
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

fn linear_sum(terms: &[(VarId, f64)], handles: &[Variable]) -> Expression {
    terms.iter().map(|&(v, c)| handles[v.0] * c).sum()
}

impl MilpSolver for MicrolpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &MilpModel) -> Result<MilpOutcome, String> {
        if self.config.verbose {
            debug!(
                "microlp has no time limit; ignoring {:.0}s for model '{}'",
                self.config.time_limit,
                model.name()
            );
        }

        let mut problem_vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .vars()
            .iter()
            .map(|spec| {
                let definition = match spec.kind {
                    VarKind::Binary => variable().binary(),
                    VarKind::Integer { lower, upper } => variable().integer().min(lower).max(upper),
                    VarKind::Continuous { lower, upper: Some(upper) } => {
                        variable().min(lower).max(upper)
                    }
                    VarKind::Continuous { lower, upper: None } => variable().min(lower),
                };
                problem_vars.add(definition.name(spec.name.clone()))
            })
            .collect();

        let objective = linear_sum(model.objective(), &handles);
        let mut problem = problem_vars.minimise(objective).using(microlp);

        for c in model.constraints() {
            let lhs = linear_sum(&c.terms, &handles);
            let rhs = c.rhs;
            problem = match c.sense {
                Sense::LessEqual => problem.with(constraint!(lhs <= rhs)),
                Sense::Equal => problem.with(constraint!(lhs == rhs)),
                Sense::GreaterEqual => problem.with(constraint!(lhs >= rhs)),
            };
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|&h| solution.value(h)).collect();
                let objective = model.evaluate_objective(&values);
                Ok(MilpOutcome {
                    status: SolveStatus::Optimal,
                    values,
                    objective: Some(objective),
                })
            }
            Err(ResolutionError::Infeasible) => Ok(MilpOutcome::without_solution(SolveStatus::Infeasible)),
            Err(ResolutionError::Unbounded) => Ok(MilpOutcome::without_solution(SolveStatus::Unbounded)),
            Err(other) => {
                warn!("microlp stopped without a solution: {}", other);
                Ok(MilpOutcome::without_solution(SolveStatus::NotSolved))
            }
        }
    }
}
