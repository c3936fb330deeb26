//! Linear-programming relaxation solver.
//!
//! [`solve`] runs a two-phase dense-tableau simplex over a set of
//! constraints plus per-variable ranges and reports one of three verdicts:
//! bounded (with optimum and solution vector), unbounded (with a ray of
//! unbounded improvement), or infeasible.

mod solver;
mod types;

pub use solver::solve;
pub use types::{LpOutcome, VarBounds};
