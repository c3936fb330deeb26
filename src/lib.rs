//! Integer linear programming from first principles.
//!
//! Solves pure-integer linear programs, where every variable ranges over
//! the non-negative integers, with a two-phase dense-tableau simplex for
//! the LP relaxations and a best-first branch-and-bound search on top:
//!
//! - **Model**: named variables, sparse linear objective and constraints
//!   with `<=` / `=` / `>=` relations, automatic sign-normalisation of
//!   negative right-hand sides.
//! - **Tableau**: dense row-major matrix with pivot, row-scale, and
//!   row-combine primitives, plus an optional four-lane vectorised
//!   elimination kernel.
//! - **LP**: two-phase simplex with infeasibility detection via implicit
//!   artificial variables and unbounded-ray extraction.
//! - **Branch-and-bound**: LP-bound-ordered best-first search with
//!   incumbent pruning, first-fractional floor-split branching, and a
//!   worker-pool parallel driver.
//! - **Instances**: a supply-chain network-design problem family for
//!   tests and benchmarks.
//!
//! # Examples
//!
//! ```
//! use intlp::model::{Problem, Relation};
//!
//! let mut problem = Problem::maximize(&[(5.0, "x"), (4.0, "y")]);
//! problem.add_constraint(&[(6.0, "x"), (4.0, "y")], Relation::Leq, 23.0);
//!
//! let solution = problem.solve();
//! assert!(solution.is_optimal());
//! assert!((solution.extremum - 21.0).abs() < 1e-6);
//! assert_eq!(solution.value("x"), Some(1));
//! assert_eq!(solution.value("y"), Some(4));
//! ```

pub mod bnb;
pub mod instances;
pub mod lp;
pub mod model;
pub mod tableau;
pub mod tol;
