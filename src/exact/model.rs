//! Solver-independent MILP model.
//!
//! A model is a list of variables, linear constraints over them and a linear
//! objective to minimize. Backends translate it into their own API.

/// Index of a variable inside its [`MilpModel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VarKind {
    /// 0/1 integer
    Binary,
    /// Integer in `[lower, upper]`
    Integer { lower: f64, upper: f64 },
    /// Real, bounded below and optionally above
    Continuous { lower: f64, upper: Option<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarSpec {
    pub name: String,
    pub kind: VarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
}

/// `Σ coeff·var  (sense)  rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub sense: Sense,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Left-hand side evaluated at `values`
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum()
    }

    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.sense {
            Sense::LessEqual => lhs <= self.rhs + tolerance,
            Sense::Equal => (lhs - self.rhs).abs() <= tolerance,
            Sense::GreaterEqual => lhs >= self.rhs - tolerance,
        }
    }
}

/// Minimization problem
#[derive(Debug, Clone, Default)]
pub struct MilpModel {
    name: String,
    vars: Vec<VarSpec>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl MilpModel {
    pub fn new(name: impl Into<String>) -> Self {
        MilpModel {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_var(&mut self, name: impl Into<String>, kind: VarKind) -> VarId {
        self.vars.push(VarSpec {
            name: name.into(),
            kind,
        });
        VarId(self.vars.len() - 1)
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_var(name, VarKind::Binary)
    }

    pub fn add_integer(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_var(name, VarKind::Integer { lower, upper })
    }

    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: Option<f64>) -> VarId {
        self.add_var(name, VarKind::Continuous { lower, upper })
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(VarId, f64)>,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, terms: Vec<(VarId, f64)>) {
        self.objective = terms;
    }

    pub fn vars(&self) -> &[VarSpec] {
        &self.vars
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    /// Objective coefficient of every variable, zero when absent
    pub fn objective_coefficients(&self) -> Vec<f64> {
        let mut coeffs = vec![0.0; self.vars.len()];
        for &(v, c) in &self.objective {
            coeffs[v.0] += c;
        }
        coeffs
    }

    pub fn evaluate_objective(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .map(|&(v, c)| c * values.get(v.0).copied().unwrap_or(0.0))
            .sum()
    }

    /// First violated constraint, if any
    pub fn first_violation(&self, values: &[f64], tolerance: f64) -> Option<&LinearConstraint> {
        self.constraints
            .iter()
            .find(|c| !c.is_satisfied(values, tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_building() {
        let mut model = MilpModel::new("test");
        let x = model.add_binary("x");
        let y = model.add_integer("y", 1.0, 3.0);
        model.add_constraint("c", vec![(x, 1.0), (y, 2.0)], Sense::LessEqual, 5.0);
        model.set_objective(vec![(y, 1.0), (x, 4.0), (y, 0.5)]);

        assert_eq!(model.vars().len(), 2);
        assert_eq!(model.constraints().len(), 1);
        assert_eq!(model.objective_coefficients(), vec![4.0, 1.5]);
        assert_eq!(model.evaluate_objective(&[1.0, 2.0]), 7.0);
    }

    #[test]
    fn test_constraint_check() {
        let mut model = MilpModel::new("test");
        let x = model.add_binary("x");
        model.add_constraint("eq", vec![(x, 1.0)], Sense::Equal, 1.0);

        assert!(model.first_violation(&[0.9999999], 1e-6).is_none());
        assert_eq!(model.first_violation(&[0.0], 1e-6).map(|c| c.name.as_str()), Some("eq"));
    }
}
