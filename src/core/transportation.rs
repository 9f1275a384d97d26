//! Transportation simplex: collection points ship to processing centers at
//! minimum total cost.
//!
//! A starting basis of exactly `m + n - 1` cells is built with Vogel's
//! approximation (or north-west corner / least cost), then improved with the
//! MODI method: potentials `u_i + v_j = c_ij` on basic cells, reduced costs
//! `c_ij - u_i - v_j` elsewhere, and a stepping-stone pivot around the cycle
//! the entering cell closes. The final potentials are the optimality
//! certificate.
//!
//! The basis is always a spanning tree of the bipartite row/column graph.
//! Degeneracy is carried by basic cells holding zero units rather than by
//! epsilon allocations.

use crate::domain::model::{checked_total, Potentials, Scenario, Shipment, TransportationPlan};
use crate::utils::error::{Result, SolverError};
use crate::utils::validation::{validate_length, validate_matrix};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialMethod {
    #[default]
    Vogel,
    NorthwestCorner,
    LeastCost,
}

impl fmt::Display for InitialMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitialMethod::Vogel => "vogel",
            InitialMethod::NorthwestCorner => "northwest_corner",
            InitialMethod::LeastCost => "least_cost",
        };
        f.write_str(name)
    }
}

impl FromStr for InitialMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "vogel" | "vam" => Ok(InitialMethod::Vogel),
            "northwest_corner" | "northwest" | "nwc" => Ok(InitialMethod::NorthwestCorner),
            "least_cost" | "lcm" => Ok(InitialMethod::LeastCost),
            other => Err(format!(
                "unknown initial method '{}', expected vogel, northwest_corner or least_cost",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotRule {
    /// Most negative reduced cost enters.
    #[default]
    Dantzig,
    /// First negative reduced cost in row-major order enters; never cycles.
    Bland,
}

impl FromStr for PivotRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dantzig" => Ok(PivotRule::Dantzig),
            "bland" => Ok(PivotRule::Bland),
            other => Err(format!(
                "unknown pivot rule '{}', expected dantzig or bland",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbalancedPolicy {
    /// Fail with `UnbalancedProblem` when supply and demand differ.
    #[default]
    Reject,
    /// Absorb the difference with a zero-cost dummy row or column.
    Dummy,
}

pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportationOptions {
    pub initial_method: InitialMethod,
    pub pivot_rule: PivotRule,
    pub max_iterations: usize,
    pub unbalanced: UnbalancedPolicy,
}

impl Default for TransportationOptions {
    fn default() -> Self {
        Self {
            initial_method: InitialMethod::default(),
            pivot_rule: PivotRule::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            unbalanced: UnbalancedPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportationSolution {
    /// Units shipped from row `i` to column `j`.
    pub allocation: Vec<Vec<u64>>,
    /// Basic cells, row-major, including degenerate zero cells.
    pub basis: Vec<(usize, usize)>,
    pub total_cost: f64,
    pub initial_cost: f64,
    pub iterations: usize,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

/// Remaining quantities and which lines are still open while a starting
/// basis is built.
struct LineState {
    supply: Vec<u64>,
    demand: Vec<u64>,
    row_open: Vec<bool>,
    col_open: Vec<bool>,
    open_rows: usize,
    open_cols: usize,
    cells: Vec<(usize, usize, u64)>,
}

impl LineState {
    fn new(supply: &[u64], demand: &[u64]) -> Self {
        Self {
            supply: supply.to_vec(),
            demand: demand.to_vec(),
            row_open: vec![true; supply.len()],
            col_open: vec![true; demand.len()],
            open_rows: supply.len(),
            open_cols: demand.len(),
            cells: Vec::with_capacity(supply.len() + demand.len() - 1),
        }
    }

    /// Allocates as much as possible to `(i, j)` and closes exactly one line,
    /// or both when it was the last open cell. Returns `true` once finished.
    ///
    /// When row and column are exhausted together only the row closes, so a
    /// later zero allocation in that column keeps the basis at `m + n - 1`.
    fn allocate(&mut self, i: usize, j: usize) -> bool {
        let quantity = self.supply[i].min(self.demand[j]);
        self.supply[i] -= quantity;
        self.demand[j] -= quantity;
        self.cells.push((i, j, quantity));

        if self.open_rows == 1 && self.open_cols == 1 {
            self.row_open[i] = false;
            self.col_open[j] = false;
            self.open_rows = 0;
            self.open_cols = 0;
            return true;
        }

        if self.supply[i] == 0 && self.open_rows > 1 {
            self.row_open[i] = false;
            self.open_rows -= 1;
        } else {
            self.col_open[j] = false;
            self.open_cols -= 1;
        }
        false
    }
}

fn northwest_corner(supply: &[u64], demand: &[u64]) -> Vec<(usize, usize, u64)> {
    let mut state = LineState::new(supply, demand);
    let (mut i, mut j) = (0, 0);
    while !state.allocate(i, j) {
        if !state.row_open[i] {
            i += 1;
        } else {
            j += 1;
        }
    }
    state.cells
}

fn least_cost(costs: &[Vec<f64>], supply: &[u64], demand: &[u64]) -> Vec<(usize, usize, u64)> {
    let mut state = LineState::new(supply, demand);
    loop {
        let mut best: Option<(usize, usize)> = None;
        for (i, row) in costs.iter().enumerate() {
            if !state.row_open[i] {
                continue;
            }
            for (j, &c) in row.iter().enumerate() {
                if !state.col_open[j] {
                    continue;
                }
                if best.map_or(true, |(bi, bj)| c < costs[bi][bj]) {
                    best = Some((i, j));
                }
            }
        }
        let Some((i, j)) = best else {
            break;
        };
        if state.allocate(i, j) {
            break;
        }
    }
    state.cells
}

#[derive(Debug, Clone, Copy)]
struct Penalty {
    penalty: f64,
    min_cost: f64,
    is_column: bool,
    line: usize,
    /// Cheapest open cell on the line, as (row, col).
    cell: (usize, usize),
}

impl Penalty {
    /// Higher penalty first, then cheaper minimum, then rows, then lower index.
    fn precedes(&self, other: &Penalty) -> bool {
        let ordering = other
            .penalty
            .partial_cmp(&self.penalty)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                self.min_cost
                    .partial_cmp(&other.min_cost)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.is_column.cmp(&other.is_column))
            .then_with(|| self.line.cmp(&other.line));
        ordering == Ordering::Less
    }
}

/// Penalty of one line given its open cells as (position, cost).
fn line_penalty(open: impl Iterator<Item = (usize, f64)>) -> Option<(f64, f64, usize)> {
    let mut first: Option<(usize, f64)> = None;
    let mut second: Option<f64> = None;
    for (pos, c) in open {
        match first {
            None => first = Some((pos, c)),
            Some((_, best)) if c < best => {
                second = Some(best);
                first = Some((pos, c));
            }
            Some(_) => {
                if second.map_or(true, |s| c < s) {
                    second = Some(c);
                }
            }
        }
    }
    let (pos, min_cost) = first?;
    let penalty = match second {
        Some(next) => next - min_cost,
        None => min_cost,
    };
    Some((penalty, min_cost, pos))
}

fn vogel(costs: &[Vec<f64>], supply: &[u64], demand: &[u64]) -> Vec<(usize, usize, u64)> {
    let mut state = LineState::new(supply, demand);
    let (m, n) = (supply.len(), demand.len());

    loop {
        let mut best: Option<Penalty> = None;
        let mut consider = |candidate: Penalty| {
            if best.map_or(true, |b| candidate.precedes(&b)) {
                best = Some(candidate);
            }
        };

        for i in (0..m).filter(|&i| state.row_open[i]) {
            let open = (0..n)
                .filter(|&j| state.col_open[j])
                .map(|j| (j, costs[i][j]));
            if let Some((penalty, min_cost, j)) = line_penalty(open) {
                consider(Penalty {
                    penalty,
                    min_cost,
                    is_column: false,
                    line: i,
                    cell: (i, j),
                });
            }
        }
        for j in (0..n).filter(|&j| state.col_open[j]) {
            let open = (0..m)
                .filter(|&i| state.row_open[i])
                .map(|i| (i, costs[i][j]));
            if let Some((penalty, min_cost, i)) = line_penalty(open) {
                consider(Penalty {
                    penalty,
                    min_cost,
                    is_column: true,
                    line: j,
                    cell: (i, j),
                });
            }
        }

        let Some(choice) = best else {
            break;
        };
        let (i, j) = choice.cell;
        if state.allocate(i, j) {
            break;
        }
    }
    state.cells
}

struct Tableau<'a> {
    costs: &'a [Vec<f64>],
    m: usize,
    n: usize,
    allocation: Vec<Vec<u64>>,
    basic: Vec<Vec<bool>>,
    tolerance: f64,
}

impl<'a> Tableau<'a> {
    fn new(costs: &'a [Vec<f64>], cells: &[(usize, usize, u64)]) -> Self {
        let m = costs.len();
        let n = costs[0].len();
        let mut allocation = vec![vec![0; n]; m];
        let mut basic = vec![vec![false; n]; m];
        for &(i, j, q) in cells {
            allocation[i][j] = q;
            basic[i][j] = true;
        }
        let max_abs = costs
            .iter()
            .flatten()
            .fold(1.0_f64, |acc, c| acc.max(c.abs()));
        Self {
            costs,
            m,
            n,
            allocation,
            basic,
            tolerance: 1e-9 * max_abs,
        }
    }

    fn total_cost(&self) -> f64 {
        let mut total = 0.0;
        for i in 0..self.m {
            for j in 0..self.n {
                total += self.allocation[i][j] as f64 * self.costs[i][j];
            }
        }
        total
    }

    fn basis(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for i in 0..self.m {
            for j in 0..self.n {
                if self.basic[i][j] {
                    cells.push((i, j));
                }
            }
        }
        cells
    }

    /// Solves `u_i + v_j = c_ij` over the basis tree with `u_0 = 0`.
    fn potentials(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut u: Vec<Option<f64>> = vec![None; self.m];
        let mut v: Vec<Option<f64>> = vec![None; self.n];
        u[0] = Some(0.0);

        // Nodes 0..m are rows, m..m+n are columns.
        let mut stack = vec![0usize];
        while let Some(node) = stack.pop() {
            if node < self.m {
                let i = node;
                let ui = u[i].unwrap_or_default();
                for j in 0..self.n {
                    if self.basic[i][j] && v[j].is_none() {
                        v[j] = Some(self.costs[i][j] - ui);
                        stack.push(self.m + j);
                    }
                }
            } else {
                let j = node - self.m;
                let vj = v[j].unwrap_or_default();
                for i in 0..self.m {
                    if self.basic[i][j] && u[i].is_none() {
                        u[i] = Some(self.costs[i][j] - vj);
                        stack.push(i);
                    }
                }
            }
        }

        let u: Option<Vec<f64>> = u.into_iter().collect();
        let v: Option<Vec<f64>> = v.into_iter().collect();
        match (u, v) {
            (Some(u), Some(v)) => Ok((u, v)),
            _ => Err(SolverError::DegenerateBasis {
                message: "basis does not span every row and column".to_string(),
            }),
        }
    }

    fn entering_cell(&self, u: &[f64], v: &[f64], rule: PivotRule) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for i in 0..self.m {
            for j in 0..self.n {
                if self.basic[i][j] {
                    continue;
                }
                let reduced = self.costs[i][j] - u[i] - v[j];
                if reduced >= -self.tolerance {
                    continue;
                }
                match rule {
                    PivotRule::Bland => return Some((i, j)),
                    PivotRule::Dantzig => {
                        if best.map_or(true, |(_, _, r)| reduced < r) {
                            best = Some((i, j, reduced));
                        }
                    }
                }
            }
        }
        best.map(|(i, j, _)| (i, j))
    }

    /// Cells on the tree path from row `row` to column `col`, in path order.
    fn tree_path(&self, row: usize, col: usize) -> Result<Vec<(usize, usize)>> {
        let total = self.m + self.n;
        let target = self.m + col;
        let mut prev: Vec<Option<usize>> = vec![None; total];
        let mut seen = vec![false; total];
        seen[row] = true;

        let mut stack = vec![row];
        while let Some(node) = stack.pop() {
            if node == target {
                break;
            }
            let neighbours: Vec<usize> = if node < self.m {
                (0..self.n)
                    .filter(|&j| self.basic[node][j])
                    .map(|j| self.m + j)
                    .collect()
            } else {
                let j = node - self.m;
                (0..self.m).filter(|&i| self.basic[i][j]).collect()
            };
            for next in neighbours {
                if !seen[next] {
                    seen[next] = true;
                    prev[next] = Some(node);
                    stack.push(next);
                }
            }
        }

        if !seen[target] {
            return Err(SolverError::DegenerateBasis {
                message: format!("no basis path from row {} to column {}", row, col),
            });
        }

        let mut nodes = vec![target];
        let mut cursor = target;
        while let Some(p) = prev[cursor] {
            nodes.push(p);
            cursor = p;
        }
        nodes.reverse();

        Ok(nodes
            .windows(2)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                if a < self.m {
                    (a, b - self.m)
                } else {
                    (b, a - self.m)
                }
            })
            .collect())
    }

    /// Moves θ units around the cycle closed by `(row, col)` and swaps it
    /// into the basis. Returns θ.
    fn pivot(&mut self, row: usize, col: usize) -> Result<u64> {
        let path = self.tree_path(row, col)?;
        // Path cells alternate -, +, -, ... with the entering cell as the leading +.
        let minus: Vec<(usize, usize)> = path.iter().copied().step_by(2).collect();
        let plus: Vec<(usize, usize)> = path.iter().copied().skip(1).step_by(2).collect();

        let theta = minus
            .iter()
            .map(|&(i, j)| self.allocation[i][j])
            .min()
            .ok_or_else(|| SolverError::DegenerateBasis {
                message: format!("empty cycle for cell ({}, {})", row, col),
            })?;
        let leaving = minus
            .iter()
            .copied()
            .filter(|&(i, j)| self.allocation[i][j] == theta)
            .min()
            .ok_or_else(|| SolverError::DegenerateBasis {
                message: "no leaving cell".to_string(),
            })?;

        for &(i, j) in &minus {
            self.allocation[i][j] -= theta;
        }
        for &(i, j) in &plus {
            self.allocation[i][j] += theta;
        }
        self.allocation[row][col] = theta;
        self.basic[row][col] = true;
        self.basic[leaving.0][leaving.1] = false;

        tracing::debug!(
            "Pivot: ({}, {}) enters, ({}, {}) leaves, θ = {}",
            row,
            col,
            leaving.0,
            leaving.1,
            theta
        );
        Ok(theta)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransportationSolver {
    options: TransportationOptions,
}

impl TransportationSolver {
    pub fn new(options: TransportationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransportationOptions {
        &self.options
    }

    /// Solves a balanced problem. `costs` is `supply.len() x demand.len()`.
    pub fn solve(
        &self,
        costs: &[Vec<f64>],
        supply: &[u64],
        demand: &[u64],
    ) -> Result<TransportationSolution> {
        let (m, n) = (supply.len(), demand.len());
        if m == 0 || n == 0 {
            return Err(SolverError::EmptyProblem {
                what: "transportation needs at least one source and one destination".to_string(),
            });
        }
        validate_matrix("transportation_costs", costs, m, n)?;

        let total_supply = checked_total("supply", supply)?;
        let total_demand = checked_total("demand", demand)?;
        if total_supply != total_demand {
            return Err(SolverError::UnbalancedProblem {
                supply: total_supply,
                demand: total_demand,
            });
        }

        let cells = match self.options.initial_method {
            InitialMethod::Vogel => vogel(costs, supply, demand),
            InitialMethod::NorthwestCorner => northwest_corner(supply, demand),
            InitialMethod::LeastCost => least_cost(costs, supply, demand),
        };
        if cells.len() != m + n - 1 {
            return Err(SolverError::DegenerateBasis {
                message: format!(
                    "initial basis has {} cells, expected {}",
                    cells.len(),
                    m + n - 1
                ),
            });
        }

        let mut tableau = Tableau::new(costs, &cells);
        let initial_cost = tableau.total_cost();
        tracing::debug!(
            "Initial basis ({}) cost {:.2}",
            self.options.initial_method,
            initial_cost
        );

        let mut iterations = 0;
        let (u, v) = loop {
            let (u, v) = tableau.potentials()?;
            let Some((row, col)) = tableau.entering_cell(&u, &v, self.options.pivot_rule) else {
                break (u, v);
            };
            if iterations >= self.options.max_iterations {
                return Err(SolverError::IterationLimit {
                    limit: self.options.max_iterations,
                });
            }
            tableau.pivot(row, col)?;
            iterations += 1;
        };

        let total_cost = tableau.total_cost();
        tracing::debug!(
            "MODI finished after {} pivots, cost {:.2} -> {:.2}",
            iterations,
            initial_cost,
            total_cost
        );

        Ok(TransportationSolution {
            basis: tableau.basis(),
            allocation: tableau.allocation,
            total_cost,
            initial_cost,
            iterations,
            u,
            v,
        })
    }

    pub fn solve_scenario(&self, scenario: &Scenario) -> Result<TransportationPlan> {
        let sources = &scenario.collection_points;
        let centers = &scenario.processing_centers;
        validate_length("supply", sources.len(), scenario.supply.len())?;
        validate_length("demand", centers.len(), scenario.demand.len())?;
        validate_matrix(
            "transportation_costs",
            &scenario.transportation_costs,
            sources.len(),
            centers.len(),
        )?;

        let total_supply = scenario.total_supply()?;
        let total_demand = scenario.total_demand()?;

        let mut costs = scenario.transportation_costs.clone();
        let mut supply = scenario.supply.clone();
        let mut demand = scenario.demand.clone();
        let (m, n) = (supply.len(), demand.len());

        if total_supply != total_demand {
            match self.options.unbalanced {
                UnbalancedPolicy::Reject => {
                    return Err(SolverError::UnbalancedProblem {
                        supply: total_supply,
                        demand: total_demand,
                    });
                }
                UnbalancedPolicy::Dummy if total_supply > total_demand => {
                    tracing::warn!(
                        "Supply exceeds demand by {}, adding a dummy processing center",
                        total_supply - total_demand
                    );
                    for row in &mut costs {
                        row.push(0.0);
                    }
                    demand.push(total_supply - total_demand);
                }
                UnbalancedPolicy::Dummy => {
                    tracing::warn!(
                        "Demand exceeds supply by {}, adding a dummy collection point",
                        total_demand - total_supply
                    );
                    costs.push(vec![0.0; n]);
                    supply.push(total_demand - total_supply);
                }
            }
        }

        let solution = self.solve(&costs, &supply, &demand)?;

        let mut shipments = Vec::new();
        for i in 0..m {
            for j in 0..n {
                let quantity = solution.allocation[i][j];
                if quantity == 0 {
                    continue;
                }
                let unit_cost = costs[i][j];
                shipments.push(Shipment {
                    from: sources[i].clone(),
                    to: centers[j].clone(),
                    source_index: i,
                    destination_index: j,
                    quantity,
                    unit_cost,
                    cost: quantity as f64 * unit_cost,
                });
            }
        }

        let unshipped_supply = if demand.len() > n {
            (0..m).map(|i| solution.allocation[i][n]).collect()
        } else {
            vec![0; m]
        };
        let unmet_demand = if supply.len() > m {
            solution.allocation[m].clone()
        } else {
            vec![0; n]
        };

        tracing::info!(
            "Transportation plan: {} routes, cost {:.2} ({} start {:.2}, {} pivots)",
            shipments.len(),
            solution.total_cost,
            self.options.initial_method,
            solution.initial_cost,
            solution.iterations
        );

        let mut u = solution.u;
        let mut v = solution.v;
        u.truncate(m);
        v.truncate(n);

        Ok(TransportationPlan {
            shipments,
            total_cost: solution.total_cost,
            initial_cost: solution.initial_cost,
            initial_method: self.options.initial_method.to_string(),
            iterations: solution.iterations,
            potentials: Potentials { u, v },
            unshipped_supply,
            unmet_demand,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textbook() -> (Vec<Vec<f64>>, Vec<u64>, Vec<u64>) {
        (
            vec![
                vec![19.0, 30.0, 50.0, 10.0],
                vec![70.0, 30.0, 40.0, 60.0],
                vec![40.0, 8.0, 70.0, 20.0],
            ],
            vec![7, 9, 18],
            vec![5, 8, 7, 14],
        )
    }

    fn solver(method: InitialMethod) -> TransportationSolver {
        TransportationSolver::new(TransportationOptions {
            initial_method: method,
            ..TransportationOptions::default()
        })
    }

    #[test]
    fn test_vogel_starting_basis() {
        let (costs, supply, demand) = textbook();
        let cells = vogel(&costs, &supply, &demand);
        assert_eq!(
            cells,
            vec![
                (2, 1, 8),
                (0, 0, 5),
                (2, 3, 10),
                (0, 3, 2),
                (1, 3, 2),
                (1, 2, 7),
            ]
        );
    }

    #[test]
    fn test_modi_improves_vogel_to_optimum() {
        let (costs, supply, demand) = textbook();
        let solution = solver(InitialMethod::Vogel)
            .solve(&costs, &supply, &demand)
            .unwrap();

        assert_eq!(solution.initial_cost, 779.0);
        assert_eq!(solution.total_cost, 743.0);
        assert_eq!(solution.iterations, 1);
        assert_eq!(solution.u, vec![0.0, 32.0, 10.0]);
        assert_eq!(solution.v, vec![19.0, -2.0, 8.0, 10.0]);
        assert_eq!(
            solution.allocation,
            vec![vec![5, 0, 0, 2], vec![0, 2, 7, 0], vec![0, 6, 0, 12]]
        );
    }

    #[test]
    fn test_every_starting_method_reaches_same_optimum() {
        let (costs, supply, demand) = textbook();
        for method in [
            InitialMethod::Vogel,
            InitialMethod::NorthwestCorner,
            InitialMethod::LeastCost,
        ] {
            let solution = solver(method).solve(&costs, &supply, &demand).unwrap();
            assert_eq!(solution.total_cost, 743.0, "method {}", method);
            assert_eq!(solution.basis.len(), 6);
        }
        let nwc = solver(InitialMethod::NorthwestCorner)
            .solve(&costs, &supply, &demand)
            .unwrap();
        assert_eq!(nwc.initial_cost, 1015.0);
    }

    #[test]
    fn test_simultaneous_exhaustion_keeps_basis_size() {
        // Row 0 and column 0 run out together on the first allocation.
        let costs = vec![vec![1.0, 4.0], vec![3.0, 2.0]];
        let cells = northwest_corner(&[5, 5], &[5, 5]);
        assert_eq!(cells, vec![(0, 0, 5), (1, 0, 0), (1, 1, 5)]);

        let solution = solver(InitialMethod::NorthwestCorner)
            .solve(&costs, &[5, 5], &[5, 5])
            .unwrap();
        assert_eq!(solution.total_cost, 15.0);
        assert_eq!(solution.basis.len(), 3);
    }

    #[test]
    fn test_zero_supply_row_is_handled() {
        let costs = vec![vec![2.0, 3.0], vec![1.0, 1.0], vec![5.0, 4.0]];
        let solution = TransportationSolver::default()
            .solve(&costs, &[0, 6, 4], &[3, 7])
            .unwrap();
        assert_eq!(solution.allocation[0], vec![0, 0]);
        assert_eq!(solution.basis.len(), 4);
        assert_eq!(solution.total_cost, 6.0 + 16.0);
    }

    #[test]
    fn test_bland_rule_reaches_optimum() {
        let (costs, supply, demand) = textbook();
        let solver = TransportationSolver::new(TransportationOptions {
            initial_method: InitialMethod::NorthwestCorner,
            pivot_rule: PivotRule::Bland,
            ..TransportationOptions::default()
        });
        let solution = solver.solve(&costs, &supply, &demand).unwrap();
        assert_eq!(solution.total_cost, 743.0);
    }

    #[test]
    fn test_iteration_limit_is_reported() {
        let (costs, supply, demand) = textbook();
        let solver = TransportationSolver::new(TransportationOptions {
            initial_method: InitialMethod::NorthwestCorner,
            max_iterations: 0,
            ..TransportationOptions::default()
        });
        assert!(matches!(
            solver.solve(&costs, &supply, &demand),
            Err(SolverError::IterationLimit { limit: 0 })
        ));
    }

    #[test]
    fn test_unbalanced_rejected_by_default() {
        let err = TransportationSolver::default()
            .solve(&[vec![1.0]], &[5], &[4])
            .unwrap_err();
        assert_eq!(err.to_string(), "Supply (5) must equal Demand (4)");
    }

    #[test]
    fn test_overflowing_totals_are_rejected() {
        let err = TransportationSolver::default()
            .solve(&[vec![1.0], vec![2.0]], &[u64::MAX, 1], &[5])
            .unwrap_err();
        assert!(matches!(err, SolverError::ValidationError { .. }));

        let mut scenario = Scenario::default();
        scenario.supply = vec![u64::MAX, 1, 0];
        let solver = TransportationSolver::new(TransportationOptions {
            unbalanced: UnbalancedPolicy::Dummy,
            ..TransportationOptions::default()
        });
        assert!(matches!(
            solver.solve_scenario(&scenario),
            Err(SolverError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_default_scenario_plan() {
        let plan = TransportationSolver::default()
            .solve_scenario(&Scenario::default())
            .unwrap();

        assert_eq!(plan.total_cost, 4140.0);
        assert_eq!(plan.initial_cost, 4140.0);
        assert_eq!(plan.iterations, 0);
        assert_eq!(plan.initial_method, "vogel");
        let routes: Vec<(usize, usize, u64)> = plan
            .shipments
            .iter()
            .map(|s| (s.source_index, s.destination_index, s.quantity))
            .collect();
        assert_eq!(
            routes,
            vec![(0, 0, 80), (0, 2, 20), (1, 1, 120), (1, 2, 30), (2, 2, 120)]
        );
        assert_eq!(plan.shipments[0].from, "Collection Point 1");
        assert_eq!(plan.shipments[0].to, "Processing Center 1");
        assert_eq!(plan.shipments[0].cost, 800.0);
    }

    #[test]
    fn test_dummy_center_absorbs_excess_supply() {
        let mut scenario = Scenario::default();
        scenario.supply[0] = 130;
        let solver = TransportationSolver::new(TransportationOptions {
            unbalanced: UnbalancedPolicy::Dummy,
            ..TransportationOptions::default()
        });
        let plan = solver.solve_scenario(&scenario).unwrap();

        assert_eq!(plan.unshipped_supply.iter().sum::<u64>(), 30);
        assert_eq!(plan.unmet_demand, vec![0, 0, 0]);
        assert_eq!(plan.potentials.v.len(), 3);
        let delivered: u64 = plan.shipments.iter().map(|s| s.quantity).sum();
        assert_eq!(delivered, 370);
        assert!(plan.shipments.iter().all(|s| s.destination_index < 3));
    }

    #[test]
    fn test_dummy_source_reports_unmet_demand() {
        let mut scenario = Scenario::default();
        scenario.demand[2] = 200;
        let solver = TransportationSolver::new(TransportationOptions {
            unbalanced: UnbalancedPolicy::Dummy,
            ..TransportationOptions::default()
        });
        let plan = solver.solve_scenario(&scenario).unwrap();
        assert_eq!(plan.unmet_demand.iter().sum::<u64>(), 30);
        assert_eq!(plan.unshipped_supply, vec![0, 0, 0]);
        assert_eq!(plan.potentials.u.len(), 3);
    }

    #[test]
    fn test_parse_initial_method_aliases() {
        assert_eq!("VAM".parse::<InitialMethod>().unwrap(), InitialMethod::Vogel);
        assert_eq!(
            "northwest-corner".parse::<InitialMethod>().unwrap(),
            InitialMethod::NorthwestCorner
        );
        assert!("simplex".parse::<InitialMethod>().is_err());
    }
}
