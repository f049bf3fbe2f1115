//! Gurobi MILP backend.
//!
//! Translates a [`MilpModel`] into a Gurobi model and maps the terminal
//! status back. Only built with the `gurobi` feature.

use grb::expr::LinExpr;
use grb::prelude::*;
use log::{info, warn};

use super::{MilpModel, MilpOutcome, MilpSolver, Sense, SolveStatus, VarKind};
use crate::config::SolverConfig;

/// Gurobi-based exact solver
pub struct GurobiSolver {
    config: SolverConfig,
}

impl GurobiSolver {
    pub fn new(config: SolverConfig) -> Self {
        GurobiSolver { config }
    }
}

impl MilpSolver for GurobiSolver {
    fn name(&self) -> &str {
        "gurobi"
    }

    fn solve(&self, milp: &MilpModel) -> Result<MilpOutcome, String> {
        let env = Env::new("")
            .map_err(|e| format!("Failed to create Gurobi environment: {}", e))?;

        let mut model = Model::with_env(milp.name(), env)
            .map_err(|e| format!("Failed to create model: {}", e))?;

        model.set_param(param::TimeLimit, self.config.time_limit)
            .map_err(|e| format!("Failed to set time limit: {}", e))?;

        if !self.config.verbose {
            model.set_param(param::OutputFlag, 0)
                .map_err(|e| format!("Failed to set output flag: {}", e))?;
        }

        let obj = milp.objective_coefficients();
        let mut vars: Vec<Var> = Vec::with_capacity(milp.vars().len());
        for (idx, spec) in milp.vars().iter().enumerate() {
            let var = match spec.kind {
                VarKind::Binary => add_binvar!(model,
                    name: &spec.name,
                    obj: obj[idx]
                ),
                VarKind::Integer { lower, upper } => add_intvar!(model,
                    name: &spec.name,
                    obj: obj[idx],
                    bounds: lower..upper
                ),
                VarKind::Continuous { lower, upper } => add_ctsvar!(model,
                    name: &spec.name,
                    obj: obj[idx],
                    bounds: lower..upper.unwrap_or(grb::INFINITY)
                ),
            }
            .map_err(|e| format!("Failed to add variable {}: {}", spec.name, e))?;
            vars.push(var);
        }

        model.update()
            .map_err(|e| format!("Failed to update model: {}", e))?;

        for constr in milp.constraints() {
            let mut lhs = LinExpr::new();
            for &(v, coeff) in &constr.terms {
                lhs.add_term(coeff, vars[v.0]);
            }
            let lhs: Expr = lhs.into();
            let rhs = constr.rhs;
            let bound = match constr.sense {
                Sense::LessEqual => c!(lhs <= rhs),
                Sense::Equal => c!(lhs == rhs),
                Sense::GreaterEqual => c!(lhs >= rhs),
            };
            model.add_constr(&constr.name, bound)
                .map_err(|e| format!("Failed to add constraint {}: {}", constr.name, e))?;
        }

        model.update()
            .map_err(|e| format!("Failed to update model before optimization: {}", e))?;

        model.optimize()
            .map_err(|e| format!("Optimization failed: {}", e))?;

        let status = model.status()
            .map_err(|e| format!("Failed to get status: {}", e))?;

        let mapped = match status {
            Status::Optimal => SolveStatus::Optimal,
            Status::Infeasible => SolveStatus::Infeasible,
            Status::Unbounded => SolveStatus::Unbounded,
            Status::InfOrUnbd => SolveStatus::Undefined,
            _ => SolveStatus::NotSolved,
        };

        if mapped != SolveStatus::Optimal {
            warn!("Gurobi finished model '{}' with status {:?}", milp.name(), status);
            return Ok(MilpOutcome::without_solution(mapped));
        }

        let mut values = Vec::with_capacity(vars.len());
        for var in &vars {
            let val = model.get_obj_attr(attr::X, var)
                .map_err(|e| format!("Failed to read solution value: {}", e))?;
            values.push(val);
        }
        let objective = model.get_attr(attr::ObjVal)
            .map_err(|e| format!("Failed to get objective: {}", e))?;
        let nodes = model.get_attr(attr::NodeCount).unwrap_or(0.0);
        info!("Gurobi solved '{}' to optimality ({} B&B nodes)", milp.name(), nodes);

        Ok(MilpOutcome {
            status: mapped,
            values,
            objective: Some(objective),
        })
    }
}
