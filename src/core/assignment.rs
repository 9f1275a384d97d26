//! Vehicle-to-zone assignment.
//!
//! `solve_assignment` is the Hungarian method in its shortest augmenting path
//! form with row/column potentials, O(n³) on the padded square matrix.
//! Rectangular inputs are padded with zero-cost dummy rows or columns; whoever
//! ends up matched to a dummy is reported as unassigned.

use crate::domain::model::{Assignment, AssignmentPlan, Scenario};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::validate_matrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentOptions {
    /// Refuse to solve unless there are exactly as many vehicles as zones.
    pub require_square: bool,
}

/// Matching on the unpadded input matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSolution {
    /// `row_to_col[i] = Some(j)` when row `i` is matched to column `j`.
    pub row_to_col: Vec<Option<usize>>,
    pub total_cost: f64,
    /// Row potentials `u` and column potentials `v` of the padded problem.
    pub row_potentials: Vec<f64>,
    pub col_potentials: Vec<f64>,
}

impl AssignmentSolution {
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col
            .iter()
            .enumerate()
            .filter_map(|(i, col)| col.map(|j| (i, j)))
    }
}

fn check_shape(costs: &[Vec<f64>]) -> Result<(usize, usize)> {
    let rows = costs.len();
    if rows == 0 {
        return Err(SolverError::EmptyProblem {
            what: "assignment cost matrix has no rows".to_string(),
        });
    }
    let cols = costs[0].len();
    if cols == 0 {
        return Err(SolverError::EmptyProblem {
            what: "assignment cost matrix has no columns".to_string(),
        });
    }
    validate_matrix("assignment_costs", costs, rows, cols)?;
    Ok((rows, cols))
}

pub fn solve_assignment(costs: &[Vec<f64>]) -> Result<AssignmentSolution> {
    let (rows, cols) = check_shape(costs)?;
    let n = rows.max(cols);

    let cost = |i: usize, j: usize| -> f64 {
        if i < rows && j < cols {
            costs[i][j]
        } else {
            0.0
        }
    };

    // 1-based: index 0 of `p`/`way` is the virtual column the search starts from.
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        // Flip the augmenting path back to the virtual column.
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![None; rows];
    let mut total_cost = 0.0;
    for j in 1..=n {
        let i = p[j];
        if i == 0 {
            continue;
        }
        let (row, col) = (i - 1, j - 1);
        if row < rows && col < cols {
            row_to_col[row] = Some(col);
            total_cost += costs[row][col];
        }
    }

    Ok(AssignmentSolution {
        row_to_col,
        total_cost,
        row_potentials: u[1..].to_vec(),
        col_potentials: v[1..].to_vec(),
    })
}

/// Each row takes its cheapest column, first one on ties.
///
/// Not a valid assignment: two rows can pick the same column. Kept as the
/// baseline the optimal plan is compared against.
pub fn greedy_row_minimum(costs: &[Vec<f64>]) -> Vec<(usize, f64)> {
    costs
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            let mut best = 0;
            for (j, &c) in row.iter().enumerate() {
                if c < row[best] {
                    best = j;
                }
            }
            (best, row[best])
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentSolver {
    options: AssignmentOptions,
}

impl AssignmentSolver {
    pub fn new(options: AssignmentOptions) -> Self {
        Self { options }
    }

    pub fn solve(&self, scenario: &Scenario) -> Result<AssignmentPlan> {
        let vehicles = &scenario.vehicles;
        let zones = &scenario.zones;

        if self.options.require_square && vehicles.len() != zones.len() {
            return Err(SolverError::ValidationError {
                message: format!(
                    "Number of vehicles ({}) must equal number of zones ({})",
                    vehicles.len(),
                    zones.len()
                ),
            });
        }
        validate_matrix(
            "assignment_costs",
            &scenario.assignment_costs,
            vehicles.len(),
            zones.len(),
        )?;

        let solution = solve_assignment(&scenario.assignment_costs)?;

        let mut zone_taken = vec![false; zones.len()];
        let mut assignments = Vec::new();
        let mut unassigned_vehicles = Vec::new();
        for (i, col) in solution.row_to_col.iter().enumerate() {
            match col {
                Some(j) => {
                    zone_taken[*j] = true;
                    assignments.push(Assignment {
                        vehicle: vehicles[i].clone(),
                        zone: zones[*j].clone(),
                        vehicle_index: i,
                        zone_index: *j,
                        cost: scenario.assignment_costs[i][*j],
                    });
                }
                None => unassigned_vehicles.push(vehicles[i].clone()),
            }
        }
        let unassigned_zones = zones
            .iter()
            .zip(&zone_taken)
            .filter(|(_, taken)| !**taken)
            .map(|(zone, _)| zone.clone())
            .collect();

        let baseline_cost = greedy_row_minimum(&scenario.assignment_costs)
            .iter()
            .map(|(_, c)| c)
            .sum();

        tracing::info!(
            "Assigned {} vehicles, total cost {:.2} (row-minimum baseline {:.2})",
            assignments.len(),
            solution.total_cost,
            baseline_cost
        );

        Ok(AssignmentPlan {
            assignments,
            unassigned_vehicles,
            unassigned_zones,
            total_cost: solution.total_cost,
            baseline_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(costs: &[Vec<f64>]) -> f64 {
        fn rec(costs: &[Vec<f64>], row: usize, used: &mut Vec<bool>, acc: f64, best: &mut f64) {
            if row == costs.len() {
                *best = best.min(acc);
                return;
            }
            for j in 0..used.len() {
                if !used[j] {
                    used[j] = true;
                    rec(costs, row + 1, used, acc + costs[row][j], best);
                    used[j] = false;
                }
            }
        }
        let mut best = f64::INFINITY;
        rec(costs, 0, &mut vec![false; costs[0].len()], 0.0, &mut best);
        best
    }

    #[test]
    fn test_greedy_conflict_is_resolved() {
        // Both rows prefer column 0; the row-minimum pick would cost 1 + 1.
        let costs = vec![vec![1.0, 2.0], vec![1.0, 3.0]];
        let solution = solve_assignment(&costs).unwrap();
        assert_eq!(solution.row_to_col, vec![Some(1), Some(0)]);
        assert_eq!(solution.total_cost, 3.0);
    }

    #[test]
    fn test_three_by_three_matches_brute_force() {
        let costs = vec![
            vec![4.0, 1.0, 3.0],
            vec![2.0, 0.0, 5.0],
            vec![3.0, 2.0, 2.0],
        ];
        let solution = solve_assignment(&costs).unwrap();
        assert_eq!(solution.row_to_col, vec![Some(1), Some(0), Some(2)]);
        assert_eq!(solution.total_cost, 5.0);
        assert_eq!(solution.total_cost, brute_force(&costs));
    }

    #[test]
    fn test_dual_objective_equals_primal_on_square_input() {
        let costs = vec![
            vec![9.0, 2.0, 7.0, 8.0],
            vec![6.0, 4.0, 3.0, 7.0],
            vec![5.0, 8.0, 1.0, 8.0],
            vec![7.0, 6.0, 9.0, 4.0],
        ];
        let solution = solve_assignment(&costs).unwrap();
        let dual: f64 = solution.row_potentials.iter().sum::<f64>()
            + solution.col_potentials.iter().sum::<f64>();
        assert_eq!(solution.total_cost, 13.0);
        assert!((dual - solution.total_cost).abs() < 1e-9);
        for (i, row) in costs.iter().enumerate() {
            for (j, c) in row.iter().enumerate() {
                assert!(c - solution.row_potentials[i] - solution.col_potentials[j] >= -1e-9);
            }
        }
    }

    #[test]
    fn test_more_vehicles_than_zones_leaves_one_unassigned() {
        let costs = vec![
            vec![10.0, 19.0, 8.0, 15.0],
            vec![10.0, 18.0, 7.0, 17.0],
            vec![13.0, 16.0, 9.0, 14.0],
            vec![12.0, 19.0, 8.0, 18.0],
            vec![14.0, 17.0, 10.0, 19.0],
        ];
        let solution = solve_assignment(&costs).unwrap();
        assert_eq!(
            solution.row_to_col,
            vec![Some(0), Some(2), Some(3), None, Some(1)]
        );
        assert_eq!(solution.total_cost, 48.0);
    }

    #[test]
    fn test_single_row_picks_cheapest_column() {
        let solution = solve_assignment(&[vec![7.0, 3.0, 9.0]]).unwrap();
        assert_eq!(solution.row_to_col, vec![Some(1)]);
        assert_eq!(solution.total_cost, 3.0);
    }

    #[test]
    fn test_ties_resolve_to_first_column() {
        let solution = solve_assignment(&[vec![5.0, 5.0], vec![5.0, 5.0]]).unwrap();
        assert_eq!(solution.row_to_col, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(matches!(
            solve_assignment(&[]),
            Err(SolverError::EmptyProblem { .. })
        ));
        assert!(matches!(
            solve_assignment(&[vec![1.0, f64::INFINITY]]),
            Err(SolverError::InvalidCost { row: 0, col: 1, .. })
        ));
    }

    #[test]
    fn test_default_scenario_plan_is_one_to_one() {
        let plan = AssignmentSolver::default()
            .solve(&Scenario::default())
            .unwrap();

        assert_eq!(plan.total_cost, 165.0);
        assert_eq!(plan.baseline_cost, 165.0);
        let mut zones: Vec<usize> = plan.assignments.iter().map(|a| a.zone_index).collect();
        zones.sort_unstable();
        assert_eq!(zones, vec![0, 1, 2, 3]);
        assert_eq!(plan.assignments[0].vehicle, "Vehicle 1");
        assert_eq!(plan.assignments[0].zone, "Zone A");
        assert!(plan.unassigned_vehicles.is_empty());
        assert!(plan.unassigned_zones.is_empty());
    }

    #[test]
    fn test_require_square_rejects_extra_zone() {
        let mut scenario = Scenario::default();
        scenario.zones.push("Zone E".to_string());
        for row in &mut scenario.assignment_costs {
            row.push(50.0);
        }
        let solver = AssignmentSolver::new(AssignmentOptions {
            require_square: true,
        });
        assert!(matches!(
            solver.solve(&scenario),
            Err(SolverError::ValidationError { .. })
        ));

        let plan = AssignmentSolver::default().solve(&scenario).unwrap();
        assert_eq!(plan.unassigned_zones, vec!["Zone E".to_string()]);
    }
}
