//! Branch-and-bound tree nodes.

use crate::lp::{self, LpOutcome, VarBounds};
use crate::model::{Constraint, LinExpr};
use crate::tol;
use std::cmp::Ordering;

/// Classification of a node after its relaxation is solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Every coordinate of the LP solution is integral.
    IpFeasible,
    /// The relaxation is feasible but some coordinate is fractional.
    LpFeasible,
    /// The relaxation has no feasible point.
    Infeasible,
    /// The relaxation is unbounded.
    Unbounded,
}

/// A branch-and-bound node: the solved LP relaxation of one variable-range
/// box, plus the two child boxes when branching applies.
///
/// Nodes are value objects; the open-node queue owns them outright.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// LP relaxation solution (empty when infeasible).
    pub solution: Vec<f64>,
    /// LP relaxation minimum; integer solutions in this box can only be
    /// larger or equal.
    pub lower_bound: f64,
    /// Variable ranges of the left child (fractional nodes only).
    pub left: Vec<VarBounds>,
    /// Variable ranges of the right child (fractional nodes only).
    pub right: Vec<VarBounds>,
}

impl Node {
    /// Solves the minimisation relaxation over `bounds` and classifies the
    /// result.
    ///
    /// On a fractional solution, the branching variable is the
    /// lowest-indexed fractional coordinate. With `split = floor(value)`,
    /// the left child caps that variable at `split` and the right child
    /// raises its lower end to `split + 1`, so the two children partition
    /// the integer points of the parent box.
    pub fn evaluate(
        objective: &LinExpr,
        constraints: &[Constraint],
        bounds: Vec<VarBounds>,
        vectorized: bool,
    ) -> Self {
        match lp::solve(true, objective, constraints, &bounds, vectorized) {
            LpOutcome::Infeasible => Self {
                kind: NodeKind::Infeasible,
                solution: Vec::new(),
                lower_bound: f64::NAN,
                left: Vec::new(),
                right: Vec::new(),
            },
            LpOutcome::Unbounded {
                solution, extremum, ..
            } => Self {
                kind: NodeKind::Unbounded,
                solution,
                lower_bound: extremum,
                left: Vec::new(),
                right: Vec::new(),
            },
            LpOutcome::Bounded { solution, extremum } => {
                match first_fractional(&solution) {
                    None => Self {
                        kind: NodeKind::IpFeasible,
                        solution,
                        lower_bound: extremum,
                        left: Vec::new(),
                        right: Vec::new(),
                    },
                    Some(split_var) => {
                        let split = solution[split_var].floor();
                        let mut left = bounds.clone();
                        let mut right = bounds;
                        left[split_var].hi = split;
                        right[split_var].lo = split + 1.0;
                        Self {
                            kind: NodeKind::LpFeasible,
                            solution,
                            lower_bound: extremum,
                            left,
                            right,
                        }
                    }
                }
            }
        }
    }
}

/// Lowest-indexed coordinate that is not integral, if any.
fn first_fractional(solution: &[f64]) -> Option<usize> {
    solution.iter().position(|&x| !tol::is_integral(x))
}

// Heap ordering: the open-node queue is a max-heap, so comparisons are
// reversed to pop the smallest lower bound first. Only nodes with finite
// bounds are ever enqueued.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.lower_bound == other.lower_bound
    }
}

impl Eq for Node {}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .lower_bound
            .partial_cmp(&self.lower_bound)
            .unwrap_or(Ordering::Equal)
    }
}
