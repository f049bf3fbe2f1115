//! Exact round-trip optimizer.
//!
//! The visiting order is found by solving a MILP over the travel matrix:
//! - binary `x[i][j]` for every usable arc (arcs without a leg are left out)
//! - in-degree and out-degree of every location equal to one
//! - integer `u[i]` in `[1, N]` for every non-depot location, with the
//!   Miller-Tucker-Zemlin constraints `u[i] - u[j] + N x[i][j] <= N - 1`
//!   forbidding any cycle that avoids the depot
//!
//! The objective depends on what is minimized. Distance minimizes the summed
//! arc mileage. Time minimizes a bound `T >= duration(i,j) x[i][j]` over all
//! arcs, i.e. the longest single leg of the tour, not the total driving time.

use log::{debug, info, warn};

use crate::exact::{MilpModel, MilpOutcome, MilpSolver, Sense, SolveStatus, VarId};
use crate::instance::{Objective, TravelMatrix};
use crate::solution::{ArcSelection, TourSolution};

/// Value above which a binary is read as selected
const SELECTED_THRESHOLD: f64 = 0.5;

/// MILP built for one instance, with the handles needed to read it back
pub struct TspFormulation {
    pub model: MilpModel,
    /// `(from, to, x)` for every usable arc
    pub arcs: Vec<(usize, usize, VarId)>,
    /// MTZ position of each location (`None` for the depot)
    pub positions: Vec<Option<VarId>>,
    /// Bound variable of the time objective
    pub bound: Option<VarId>,
}

impl TspFormulation {
    pub fn build(matrix: &TravelMatrix, objective: Objective) -> Self {
        let n = matrix.dimension();
        let big_n = n as f64;
        let mut model = MilpModel::new(format!("round_trip_{}", objective));

        // Location ids are 1-based in variable names
        let arcs: Vec<(usize, usize, VarId)> = matrix
            .arcs()
            .map(|(i, j, _)| (i, j, model.add_binary(format!("x_{}_{}", i + 1, j + 1))))
            .collect();

        let positions: Vec<Option<VarId>> = (0..n)
            .map(|i| {
                if i == 0 {
                    None
                } else {
                    Some(model.add_integer(format!("u_{}", i + 1), 1.0, big_n))
                }
            })
            .collect();

        let mut bound = None;
        match objective {
            Objective::Distance => {
                let terms = arcs
                    .iter()
                    .filter_map(|&(i, j, x)| matrix.distance(i, j).map(|d| (x, d)))
                    .collect();
                model.set_objective(terms);
            }
            Objective::Duration => {
                let total = model.add_continuous("total_duration", 0.0, None);
                for &(i, j, x) in &arcs {
                    if let Some(t) = matrix.duration(i, j) {
                        model.add_constraint(
                            format!("bound_{}_{}", i + 1, j + 1),
                            vec![(total, 1.0), (x, -t)],
                            Sense::GreaterEqual,
                            0.0,
                        );
                    }
                }
                model.set_objective(vec![(total, 1.0)]);
                bound = Some(total);
            }
        }

        for v in 0..n {
            let incoming: Vec<(VarId, f64)> = arcs
                .iter()
                .filter(|&&(_, j, _)| j == v)
                .map(|&(_, _, x)| (x, 1.0))
                .collect();
            model.add_constraint(format!("in_{}", v + 1), incoming, Sense::Equal, 1.0);

            let outgoing: Vec<(VarId, f64)> = arcs
                .iter()
                .filter(|&&(i, _, _)| i == v)
                .map(|&(_, _, x)| (x, 1.0))
                .collect();
            model.add_constraint(format!("out_{}", v + 1), outgoing, Sense::Equal, 1.0);
        }

        // A missing arc has x = 0, where the MTZ row holds for any u in [1, N]
        for &(i, j, x) in &arcs {
            if let (Some(ui), Some(uj)) = (positions[i], positions[j]) {
                model.add_constraint(
                    format!("mtz_{}_{}", i + 1, j + 1),
                    vec![(ui, 1.0), (uj, -1.0), (x, big_n)],
                    Sense::LessEqual,
                    big_n - 1.0,
                );
            }
        }

        TspFormulation {
            model,
            arcs,
            positions,
            bound,
        }
    }

    /// Arcs whose binary is set in the backend's solution
    pub fn selected_arcs(&self, outcome: &MilpOutcome) -> ArcSelection {
        let arcs = self
            .arcs
            .iter()
            .filter(|&&(_, _, x)| outcome.value(x).unwrap_or(0.0) > SELECTED_THRESHOLD)
            .map(|&(i, j, _)| (i, j))
            .collect();
        ArcSelection::new(arcs)
    }
}

/// Solves the round trip with the given MILP backend
pub struct RouteOptimizer<'a> {
    solver: &'a dyn MilpSolver,
}

impl<'a> RouteOptimizer<'a> {
    pub fn new(solver: &'a dyn MilpSolver) -> Self {
        RouteOptimizer { solver }
    }

    /// Find the optimal round trip starting and ending at location 0.
    ///
    /// `Err` only when the backend itself fails; an instance without a tour
    /// is reported through the status.
    pub fn solve(&self, matrix: &TravelMatrix, objective: Objective) -> Result<TourSolution, String> {
        let n = matrix.dimension();
        if n < 2 {
            warn!("Cannot build a round trip over {} location(s)", n);
            return Ok(TourSolution::without_tour(SolveStatus::Infeasible, objective));
        }

        // Empty degree rows would reach the backend as `0 = 1`
        let isolated = matrix.isolated_nodes();
        if !isolated.is_empty() {
            let ids: Vec<usize> = isolated.iter().map(|i| i + 1).collect();
            warn!("Locations {:?} cannot be both reached and left; no tour exists", ids);
            return Ok(TourSolution::without_tour(SolveStatus::Infeasible, objective));
        }

        let tsp = TspFormulation::build(matrix, objective);
        debug!(
            "MILP '{}': {} variables, {} constraints, {} arcs excluded",
            tsp.model.name(),
            tsp.model.vars().len(),
            tsp.model.constraints().len(),
            matrix.missing_arcs()
        );

        let outcome = self.solver.solve(&tsp.model)?;
        info!("Solver {} finished with status {}", self.solver.name(), outcome.status);

        if !outcome.status.is_optimal() {
            return Ok(TourSolution::without_tour(outcome.status, objective));
        }

        Ok(TourSolution {
            status: outcome.status,
            objective,
            arcs: tsp.selected_arcs(&outcome),
            total_cost: outcome.objective,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exact::MicrolpSolver;
    use crate::instance::Leg;

    fn symmetric(d: &[[f64; 3]; 3]) -> TravelMatrix {
        let legs = (0..3)
            .map(|i| {
                (0..3)
                    .map(|j| if i == j { None } else { Some(Leg::new(d[i][j], d[i][j] * 60.0)) })
                    .collect()
            })
            .collect();
        TravelMatrix::from_legs(legs).unwrap()
    }

    fn three_nodes() -> TravelMatrix {
        symmetric(&[[0.0, 5.0, 10.0], [5.0, 0.0, 3.0], [10.0, 3.0, 0.0]])
    }

    #[test]
    fn test_formulation_sizes() {
        let matrix = three_nodes();

        let tsp = TspFormulation::build(&matrix, Objective::Distance);
        // 6 arcs + 2 positions; 6 degree rows + 2 MTZ rows
        assert_eq!(tsp.model.vars().len(), 8);
        assert_eq!(tsp.model.constraints().len(), 8);
        assert!(tsp.bound.is_none());
        assert!(tsp.positions[0].is_none());

        let tsp = TspFormulation::build(&matrix, Objective::Duration);
        // plus the bound variable and one bound row per arc
        assert_eq!(tsp.model.vars().len(), 9);
        assert_eq!(tsp.model.constraints().len(), 14);
        assert!(tsp.bound.is_some());
        assert_eq!(tsp.model.objective().len(), 1);
    }

    #[test]
    fn test_missing_arcs_left_out() {
        let l = Some(Leg::new(1.0, 1.0));
        let legs = vec![
            vec![None, l, None],
            vec![None, None, l],
            vec![l, l, None],
        ];
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        let tsp = TspFormulation::build(&matrix, Objective::Distance);

        assert_eq!(tsp.arcs.len(), 4);
        assert!(tsp.arcs.iter().all(|&(i, j, _)| !(i == 0 && j == 2)));
        // Only (1,2) and (2,1) carry MTZ rows
        let mtz = tsp.model.constraints().iter().filter(|c| c.name.starts_with("mtz_")).count();
        assert_eq!(mtz, 2);
    }

    #[test]
    fn test_selected_arcs_read_from_outcome() {
        let tsp = TspFormulation::build(&three_nodes(), Objective::Distance);
        // Arcs are numbered row-major: 0->1, 0->2, 1->0, 1->2, 2->0, 2->1
        let outcome = MilpOutcome {
            status: SolveStatus::Optimal,
            values: vec![0.9999, 0.2, 0.49, 1.0, 0.51, 0.0, 2.0, 3.0],
            objective: Some(18.0),
        };
        let arcs = tsp.selected_arcs(&outcome);
        assert_eq!(arcs.len(), 3);
        assert!(arcs.contains(0, 1) && arcs.contains(1, 2) && arcs.contains(2, 0));

        let empty = MilpOutcome::without_solution(SolveStatus::NotSolved);
        assert!(tsp.selected_arcs(&empty).is_empty());
    }

    #[test]
    fn test_three_node_distance_tour() {
        let solver = MicrolpSolver::default();
        let tour = RouteOptimizer::new(&solver)
            .solve(&three_nodes(), Objective::Distance)
            .unwrap();

        assert_eq!(tour.status, SolveStatus::Optimal);
        assert_eq!(tour.arcs.len(), 3);
        assert!((tour.total_cost.unwrap() - 18.0).abs() < 1e-6);
        let forward = tour.arcs.contains(0, 1) && tour.arcs.contains(1, 2) && tour.arcs.contains(2, 0);
        let backward = tour.arcs.contains(0, 2) && tour.arcs.contains(2, 1) && tour.arcs.contains(1, 0);
        assert!(forward || backward);
    }

    #[test]
    fn test_two_nodes_go_and_return() {
        let legs = vec![
            vec![None, Some(Leg::new(4.0, 300.0))],
            vec![Some(Leg::new(4.5, 320.0)), None],
        ];
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        let solver = MicrolpSolver::default();
        let tour = RouteOptimizer::new(&solver).solve(&matrix, Objective::Duration).unwrap();

        assert!(tour.is_optimal());
        assert_eq!(tour.arcs.iter().collect::<Vec<_>>(), vec![(0, 1), (1, 0)]);
        assert!((tour.total_cost.unwrap() - 320.0).abs() < 1e-6);
    }

    #[test]
    fn test_duration_objective_is_bottleneck() {
        // Depot 0 with stops 1..3 (minutes). Tour 0-1-2-3-0 is the shortest
        // (13) but drives a 10 minute leg; 0-1-3-2-0 sums to 14 with no leg
        // above 6.
        let t = [
            [0.0, 1.0, 6.0, 10.0],
            [1.0, 0.0, 1.0, 6.0],
            [6.0, 1.0, 0.0, 1.0],
            [10.0, 6.0, 1.0, 0.0],
        ];
        let legs = (0..4)
            .map(|i| {
                (0..4)
                    .map(|j| if i == j { None } else { Some(Leg::new(t[i][j], t[i][j] * 60.0)) })
                    .collect()
            })
            .collect();
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        let solver = MicrolpSolver::default();

        let by_time = RouteOptimizer::new(&solver).solve(&matrix, Objective::Duration).unwrap();
        assert!(by_time.is_optimal());
        assert!((by_time.total_cost.unwrap() - 6.0 * 60.0).abs() < 1e-6);
        assert!(!by_time.arcs.contains(0, 3) && !by_time.arcs.contains(3, 0));

        let by_distance = RouteOptimizer::new(&solver).solve(&matrix, Objective::Distance).unwrap();
        assert!(by_distance.is_optimal());
        assert!((by_distance.total_cost.unwrap() - 13.0).abs() < 1e-6);
        assert!(by_distance.arcs.contains(0, 3) || by_distance.arcs.contains(3, 0));
    }

    #[test]
    fn test_disconnected_instance_is_infeasible() {
        let l = Some(Leg::new(1.0, 60.0));
        // Location 2 has no incoming arc
        let legs = vec![
            vec![None, l, None],
            vec![l, None, None],
            vec![l, l, None],
        ];
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        let solver = MicrolpSolver::default();
        let tour = RouteOptimizer::new(&solver).solve(&matrix, Objective::Distance).unwrap();

        assert_eq!(tour.status, SolveStatus::Infeasible);
        assert!(tour.arcs.is_empty());
        assert!(tour.total_cost.is_none());
    }

    #[test]
    fn test_subtours_only_instance_is_infeasible() {
        // Every location has arcs in and out, but {0,1} and {2,3} are only
        // linked one way, so no single cycle exists.
        let l = Some(Leg::new(1.0, 60.0));
        let legs = vec![
            vec![None, l, None, None],
            vec![l, None, l, None],
            vec![None, None, None, l],
            vec![None, None, l, None],
        ];
        let matrix = TravelMatrix::from_legs(legs).unwrap();
        let solver = MicrolpSolver::default();
        let tour = RouteOptimizer::new(&solver).solve(&matrix, Objective::Distance).unwrap();

        assert_eq!(tour.status, SolveStatus::Infeasible);
        assert!(tour.arcs.is_empty());
    }

    #[test]
    fn test_single_location_is_infeasible() {
        let matrix = TravelMatrix::from_legs(vec![vec![None]]).unwrap();
        let solver = MicrolpSolver::default();
        let tour = RouteOptimizer::new(&solver).solve(&matrix, Objective::Distance).unwrap();
        assert_eq!(tour.status, SolveStatus::Infeasible);
    }
}
