//! Two-phase simplex over a dense tableau.
//!
//! Standard form is built from the user constraints plus per-variable range
//! constraints. Inequalities receive a slack column (`+1` for `<=`, `−1`
//! for `>=`); only a `<=` row's fresh slack is basis-eligible, so `=` and
//! `>=` rows start with an implicit artificial variable in the basis.
//!
//! Artificial columns are never materialised. Phase 1 instead adds every
//! artificial row to the objective row, which reproduces the reduced costs
//! of the minimise-sum-of-artificials objective with the artificials
//! already pivoted out of row 0. If any artificial remains basic after the
//! phase-1 inner loop, the problem is infeasible; otherwise row 0 is
//! cleared and phase 2 optimises the true objective.

use super::types::{LpOutcome, VarBounds};
use crate::model::{Constraint, LinExpr, Relation};
use crate::tableau::Tableau;
use crate::tol;

/// Solves the LP `opt objective` subject to `constraints` and per-variable
/// ranges, over variables `x_0 … x_{n−1}` where `n = bounds.len()`.
///
/// Constraints must already be sign-normalised to a non-negative rhs (see
/// [`Constraint::normalize_rhs`]). When `minimize` is false the objective
/// is maximised.
pub fn solve(
    minimize: bool,
    objective: &LinExpr,
    constraints: &[Constraint],
    bounds: &[VarBounds],
    vectorized: bool,
) -> LpOutcome {
    let range_constraints = bounds_to_constraints(bounds);
    let mut simplex = Simplex::build(
        minimize,
        constraints,
        &range_constraints,
        bounds.len(),
        vectorized,
    );
    if !simplex.phase_one() {
        return LpOutcome::Infeasible;
    }
    simplex.phase_two(objective)
}

/// Emits `x_i >= lo` / `x_i <= hi` constraints for the non-trivial ends of
/// each range.
fn bounds_to_constraints(bounds: &[VarBounds]) -> Vec<Constraint> {
    let mut out = Vec::new();
    for (var, range) in bounds.iter().enumerate() {
        if range.lo > 0.0 {
            let mut expr = LinExpr::new();
            expr.add_term(1.0, var);
            out.push(Constraint::new(expr, Relation::Geq, range.lo));
        }
        if range.hi.is_finite() {
            let mut expr = LinExpr::new();
            expr.add_term(1.0, var);
            out.push(Constraint::new(expr, Relation::Leq, range.hi));
        }
    }
    out
}

/// Why the inner loop stopped.
enum InnerStop {
    /// No entering column with positive reduced cost remains.
    Optimal,
    /// An entering column was found but no row passes the ratio test.
    Unbounded { entering: usize },
}

struct Simplex {
    tableau: Tableau,
    minimize: bool,
    var_count: usize,
}

impl Simplex {
    fn build(
        minimize: bool,
        constraints: &[Constraint],
        range_constraints: &[Constraint],
        var_count: usize,
        vectorized: bool,
    ) -> Self {
        let all = || constraints.iter().chain(range_constraints);
        let slack_count = all().filter(|c| c.has_slack()).count();
        let rows = 1 + constraints.len() + range_constraints.len();
        let cols = var_count + slack_count + 1;
        let mut tableau = Tableau::new(rows, cols, vectorized);

        let mut slack_col = var_count;
        for (offset, constraint) in all().enumerate() {
            let row = 1 + offset;
            debug_assert!(constraint.rhs >= 0.0, "constraint rhs not normalised");
            for (var, coef) in constraint.expr.iter() {
                tableau[(row, var)] = coef;
            }
            let mut basis_col = None;
            if constraint.has_slack() {
                tableau[(row, slack_col)] = constraint.slack_coef();
                basis_col = Some(slack_col);
                slack_col += 1;
            }
            tableau[(row, cols - 1)] = constraint.rhs;
            tableau.basis[row] = if constraint.needs_artificial() {
                None
            } else {
                basis_col
            };
        }

        Self {
            tableau,
            minimize,
            var_count,
        }
    }

    fn has_artificial_rows(&self) -> bool {
        (1..self.tableau.rows()).any(|row| self.tableau.basis[row].is_none())
    }

    /// Drives artificials out of the basis. Returns false when the problem
    /// is infeasible.
    fn phase_one(&mut self) -> bool {
        if !self.has_artificial_rows() {
            return true;
        }
        for row in 1..self.tableau.rows() {
            if self.tableau.basis[row].is_none() {
                self.tableau.add_scaled_row(row, 0, 1.0);
            }
        }
        // The phase-1 objective is bounded below by zero, so a genuine
        // unbounded stop cannot occur here; either way the artificial
        // check below decides feasibility.
        let _ = self.run_inner();
        if self.has_artificial_rows() {
            return false;
        }
        // Row 0 is analytically zero at this point; overwrite it to erase
        // floating-point residue before phase 2.
        self.tableau.zero_row(0);
        true
    }

    /// Optimises the true objective from the basic feasible solution left
    /// by phase 1.
    fn phase_two(&mut self, objective: &LinExpr) -> LpOutcome {
        // The inner loop minimises by entering positive reduced costs, so
        // a maximise objective lands in row 0 with its own sign and a
        // minimise objective negated.
        let sign = if self.minimize { -1.0 } else { 1.0 };
        for (var, coef) in objective.iter() {
            self.tableau[(0, var)] = coef * sign;
        }
        // Restore zero reduced cost on columns that are already basic.
        for row in 1..self.tableau.rows() {
            if let Some(col) = self.tableau.basis[row] {
                let value = self.tableau[(0, col)];
                if !tol::is_zero(value) {
                    self.tableau.add_scaled_row(row, 0, -value);
                }
            }
        }
        match self.run_inner() {
            InnerStop::Optimal => self.extract_bounded(),
            InnerStop::Unbounded { entering } => self.extract_unbounded(entering),
        }
    }

    fn run_inner(&mut self) -> InnerStop {
        loop {
            let Some(entering) = self.entering_column() else {
                return InnerStop::Optimal;
            };
            let Some(row) = self.leaving_row(entering) else {
                return InnerStop::Unbounded { entering };
            };
            self.tableau.eliminate(row, entering);
            self.tableau.basis[row] = Some(entering);
        }
    }

    /// First column with positive reduced cost, rhs column excluded.
    fn entering_column(&self) -> Option<usize> {
        (0..self.tableau.cols() - 1).find(|&col| tol::is_positive(self.tableau[(0, col)]))
    }

    /// Row with the smallest positive ratio `rhs / a[row][col]`; first wins
    /// on ties. `None` means the column grows without bound.
    fn leaving_row(&self, col: usize) -> Option<usize> {
        let rhs_col = self.tableau.cols() - 1;
        let mut best: Option<(usize, f64)> = None;
        for row in 1..self.tableau.rows() {
            let coef = self.tableau[(row, col)];
            if tol::is_positive(coef) {
                let ratio = self.tableau[(row, rhs_col)] / coef;
                if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                    best = Some((row, ratio));
                }
            }
        }
        best.map(|(row, _)| row)
    }

    /// Reads the basic values of the real variables out of the tableau.
    fn real_solution(&self) -> Vec<f64> {
        let rhs_col = self.tableau.cols() - 1;
        let mut solution = vec![0.0; self.var_count];
        for row in 1..self.tableau.rows() {
            if let Some(col) = self.tableau.basis[row] {
                if col < self.var_count {
                    solution[col] = self.tableau[(row, rhs_col)];
                }
            }
        }
        solution
    }

    fn extract_bounded(&self) -> LpOutcome {
        let rhs_col = self.tableau.cols() - 1;
        let sign = if self.minimize { 1.0 } else { -1.0 };
        LpOutcome::Bounded {
            solution: self.real_solution(),
            extremum: self.tableau[(0, rhs_col)] * sign,
        }
    }

    fn extract_unbounded(&self, entering: usize) -> LpOutcome {
        let sign = if self.minimize { 1.0 } else { -1.0 };
        let mut direction = vec![0.0; self.var_count];
        for row in 1..self.tableau.rows() {
            if let Some(col) = self.tableau.basis[row] {
                if col < self.var_count {
                    direction[col] = self.tableau[(row, entering)] * sign;
                }
            }
        }
        LpOutcome::Unbounded {
            solution: self.real_solution(),
            direction,
            extremum: if self.minimize {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(terms: &[(f64, usize)], relation: Relation, rhs: f64) -> Constraint {
        let mut expr = LinExpr::new();
        for &(coef, var) in terms {
            expr.add_term(coef, var);
        }
        let mut c = Constraint::new(expr, relation, rhs);
        c.normalize_rhs();
        c
    }

    fn objective(terms: &[(f64, usize)]) -> LinExpr {
        let mut expr = LinExpr::new();
        for &(coef, var) in terms {
            expr.add_term(coef, var);
        }
        expr
    }

    fn free(n: usize) -> Vec<VarBounds> {
        vec![VarBounds::nonneg(); n]
    }

    /// max x + y s.t. 4x+3y <= 17, 2x−5y >= −9, x+10y >= 25.
    /// Optimum sits on 4x+3y = 17 ∩ 2x−5y = −9: (29/13, 35/13), value 64/13.
    #[test]
    fn test_bounded_two_var() {
        let obj = objective(&[(1.0, 0), (1.0, 1)]);
        let cons = vec![
            constraint(&[(4.0, 0), (3.0, 1)], Relation::Leq, 17.0),
            constraint(&[(2.0, 0), (-5.0, 1)], Relation::Geq, -9.0),
            constraint(&[(1.0, 0), (10.0, 1)], Relation::Geq, 25.0),
        ];
        match solve(false, &obj, &cons, &free(2), false) {
            LpOutcome::Bounded { solution, extremum } => {
                assert!((extremum - 64.0 / 13.0).abs() < 1e-6, "extremum {extremum}");
                assert!((solution[0] - 29.0 / 13.0).abs() < 1e-6, "x {}", solution[0]);
                assert!((solution[1] - 35.0 / 13.0).abs() < 1e-6, "y {}", solution[1]);
            }
            other => panic!("expected bounded, got {other:?}"),
        }
    }

    /// Tightening the third constraint of the bounded instance to
    /// x+10y >= 30 empties the feasible region.
    #[test]
    fn test_infeasible() {
        let obj = objective(&[(1.0, 0), (1.0, 1)]);
        let cons = vec![
            constraint(&[(4.0, 0), (3.0, 1)], Relation::Leq, 17.0),
            constraint(&[(2.0, 0), (-5.0, 1)], Relation::Geq, -9.0),
            constraint(&[(1.0, 0), (10.0, 1)], Relation::Geq, 30.0),
        ];
        assert_eq!(solve(false, &obj, &cons, &free(2), false), LpOutcome::Infeasible);
    }

    /// max x s.t. x−y <= 1, 2x−y <= 4 is unbounded along a ray with
    /// growing x.
    #[test]
    fn test_unbounded_with_ray_contract() {
        let obj = objective(&[(1.0, 0)]);
        let cons = vec![
            constraint(&[(1.0, 0), (-1.0, 1)], Relation::Leq, 1.0),
            constraint(&[(2.0, 0), (-1.0, 1)], Relation::Leq, 4.0),
        ];
        match solve(false, &obj, &cons, &free(2), false) {
            LpOutcome::Unbounded {
                solution,
                direction,
                extremum,
            } => {
                assert_eq!(extremum, f64::INFINITY);
                assert!(direction[0] > 0.0, "direction {direction:?}");
                // Contract: solution + t·direction stays feasible and the
                // objective strictly improves for t > 0.
                for t in [0.0, 1.0, 10.0, 1000.0] {
                    let x = solution[0] + t * direction[0];
                    let y = solution[1] + t * direction[1];
                    assert!(x - y <= 1.0 + 1e-9, "t={t}: x−y={}", x - y);
                    assert!(2.0 * x - y <= 4.0 + 1e-9, "t={t}: 2x−y={}", 2.0 * x - y);
                    assert!(x >= -1e-9 && y >= -1e-9, "t={t}: ({x}, {y})");
                }
                assert!(obj.eval(&direction) > 0.0);
            }
            other => panic!("expected unbounded, got {other:?}"),
        }
    }

    /// Maximising f and minimising −f must agree up to sign.
    #[test]
    fn test_sense_duality() {
        let cons = vec![
            constraint(&[(4.0, 0), (3.0, 1)], Relation::Leq, 17.0),
            constraint(&[(2.0, 0), (-5.0, 1)], Relation::Geq, -9.0),
            constraint(&[(1.0, 0), (10.0, 1)], Relation::Geq, 25.0),
        ];
        let max_obj = objective(&[(1.0, 0), (1.0, 1)]);
        let min_obj = max_obj.negated();
        let max_value = solve(false, &max_obj, &cons, &free(2), false).extremum();
        let min_value = solve(true, &min_obj, &cons, &free(2), false).extremum();
        assert!((max_value + min_value).abs() < 1e-6, "{max_value} vs {min_value}");
    }

    /// max 3x + y s.t. 4x+2y <= 11 with the range 1 <= x <= 2 supplied
    /// through variable bounds: optimum 7.5 at (2, 1.5).
    #[test]
    fn test_range_constraints_from_bounds() {
        let obj = objective(&[(3.0, 0), (1.0, 1)]);
        let cons = vec![constraint(&[(4.0, 0), (2.0, 1)], Relation::Leq, 11.0)];
        let bounds = vec![VarBounds::new(1.0, 2.0), VarBounds::nonneg()];
        match solve(false, &obj, &cons, &bounds, false) {
            LpOutcome::Bounded { solution, extremum } => {
                assert!((extremum - 7.5).abs() < 1e-6, "extremum {extremum}");
                assert!((solution[0] - 2.0).abs() < 1e-6);
                assert!((solution[1] - 1.5).abs() < 1e-6);
            }
            other => panic!("expected bounded, got {other:?}"),
        }
    }

    /// Equality rows go through the artificial-variable path.
    #[test]
    fn test_equality_constraint() {
        let obj = objective(&[(1.0, 0)]);
        let cons = vec![
            constraint(&[(1.0, 0), (1.0, 1)], Relation::Eq, 5.0),
            constraint(&[(1.0, 0)], Relation::Leq, 3.0),
        ];
        match solve(false, &obj, &cons, &free(2), false) {
            LpOutcome::Bounded { solution, extremum } => {
                assert!((extremum - 3.0).abs() < 1e-6);
                assert!((solution[0] - 3.0).abs() < 1e-6);
                assert!((solution[1] - 2.0).abs() < 1e-6);
            }
            other => panic!("expected bounded, got {other:?}"),
        }
    }

    /// Minimisation with a >= row (phase 1 required).
    #[test]
    fn test_minimize_with_geq() {
        let obj = objective(&[(2.0, 0), (3.0, 1)]);
        let cons = vec![
            constraint(&[(1.0, 0), (1.0, 1)], Relation::Geq, 4.0),
            constraint(&[(1.0, 0)], Relation::Leq, 3.0),
        ];
        match solve(true, &obj, &cons, &free(2), false) {
            LpOutcome::Bounded { solution, extremum } => {
                // Cheapest mix is x = 3, y = 1.
                assert!((extremum - 9.0).abs() < 1e-6, "extremum {extremum}");
                assert!((solution[0] - 3.0).abs() < 1e-6);
                assert!((solution[1] - 1.0).abs() < 1e-6);
            }
            other => panic!("expected bounded, got {other:?}"),
        }
    }

    /// Both kernels must land on the same optimum.
    #[test]
    fn test_vectorized_kernel_agrees() {
        let obj = objective(&[(1.0, 0), (1.0, 1)]);
        let cons = vec![
            constraint(&[(4.0, 0), (3.0, 1)], Relation::Leq, 17.0),
            constraint(&[(2.0, 0), (-5.0, 1)], Relation::Geq, -9.0),
            constraint(&[(1.0, 0), (10.0, 1)], Relation::Geq, 25.0),
        ];
        let scalar = solve(false, &obj, &cons, &free(2), false).extremum();
        let lanes = solve(false, &obj, &cons, &free(2), true).extremum();
        assert!((scalar - lanes).abs() < 1e-9, "{scalar} vs {lanes}");
    }

    /// An empty objective turns the solve into a pure feasibility check.
    #[test]
    fn test_empty_objective_feasibility() {
        let obj = LinExpr::new();
        let cons = vec![constraint(&[(1.0, 0), (1.0, 1)], Relation::Eq, 3.0)];
        match solve(true, &obj, &cons, &free(2), false) {
            LpOutcome::Bounded { solution, extremum } => {
                assert!((extremum - 0.0).abs() < 1e-9);
                assert!((solution[0] + solution[1] - 3.0).abs() < 1e-6);
            }
            other => panic!("expected bounded, got {other:?}"),
        }
    }
}
