//! Problem model and construction API.
//!
//! A [`Problem`] is built from an objective sense, a linear objective over
//! named variables, and a list of linear constraints. Every variable is an
//! implicitly non-negative integer with domain `[0, +∞)`. Variables are
//! registered on first mention, in order of appearance.
//!
//! # Examples
//!
//! ```
//! use intlp::model::{Problem, Relation};
//!
//! let mut problem = Problem::maximize(&[(3.0, "x"), (1.0, "y")]);
//! problem
//!     .add_constraint(&[(4.0, "x"), (2.0, "y")], Relation::Leq, 11.0)
//!     .add_constraint(&[(1.0, "x")], Relation::Leq, 2.0)
//!     .add_constraint(&[(1.0, "x")], Relation::Geq, 1.0);
//! let solution = problem.solve();
//! assert_eq!(solution.value("x"), Some(2));
//! ```

mod constraint;
mod error;
mod expr;
mod variables;

pub use constraint::{Constraint, Relation};
pub use error::ModelError;
pub use expr::LinExpr;
pub use variables::VarTable;

use crate::bnb::{BnbRunner, IpSolution, SolveConfig};
use std::fmt;
use std::str::FromStr;

/// Objective sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

impl FromStr for Sense {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Sense::Minimize),
            "max" => Ok(Sense::Maximize),
            other => Err(ModelError::UnknownSense(other.to_string())),
        }
    }
}

/// An integer linear program over named, non-negative integer variables.
#[derive(Debug, Clone)]
pub struct Problem {
    pub sense: Sense,
    pub objective: LinExpr,
    pub constraints: Vec<Constraint>,
    vars: VarTable,
}

impl Problem {
    /// Creates a problem with the given sense and objective terms.
    ///
    /// Terms are `(coefficient, variable_name)` pairs; mentioning the same
    /// variable twice accumulates its coefficient.
    ///
    /// # Panics
    /// Panics if a coefficient is not finite.
    pub fn new(sense: Sense, terms: &[(f64, &str)]) -> Self {
        let mut vars = VarTable::new();
        let mut objective = LinExpr::new();
        for &(coef, name) in terms {
            objective.add_term(coef, vars.intern(name));
        }
        Self {
            sense,
            objective,
            constraints: Vec::new(),
            vars,
        }
    }

    /// Creates a minimisation problem.
    pub fn minimize(terms: &[(f64, &str)]) -> Self {
        Self::new(Sense::Minimize, terms)
    }

    /// Creates a maximisation problem.
    pub fn maximize(terms: &[(f64, &str)]) -> Self {
        Self::new(Sense::Maximize, terms)
    }

    /// Adds the constraint `terms ⟨relation⟩ rhs`, chainable.
    ///
    /// Unseen variable names are registered. A negative right-hand side is
    /// sign-normalised immediately, so stored constraints always carry a
    /// non-negative rhs.
    ///
    /// # Panics
    /// Panics if a coefficient or `rhs` is not finite.
    pub fn add_constraint(
        &mut self,
        terms: &[(f64, &str)],
        relation: Relation,
        rhs: f64,
    ) -> &mut Self {
        let mut expr = LinExpr::new();
        for &(coef, name) in terms {
            expr.add_term(coef, self.vars.intern(name));
        }
        let mut constraint = Constraint::new(expr, relation, rhs);
        constraint.normalize_rhs();
        self.constraints.push(constraint);
        self
    }

    /// Number of registered variables.
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Name of the variable with the given index.
    pub fn var_name(&self, index: usize) -> Option<&str> {
        self.vars.name(index)
    }

    /// Index of a registered variable name.
    pub fn var_index(&self, name: &str) -> Option<usize> {
        self.vars.index(name)
    }

    /// The variable registry.
    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    /// Solves the problem with the default configuration (serial, scalar).
    pub fn solve(&self) -> IpSolution {
        BnbRunner::run(self, &SolveConfig::default())
    }

    /// Solves with parallel node evaluation on a pool sized to the
    /// machine's logical processor count.
    pub fn solve_parallel(&self) -> IpSolution {
        BnbRunner::run(self, &SolveConfig::default().with_parallel(true))
    }

    /// Solves the problem with an explicit configuration.
    pub fn solve_with(&self, config: &SolveConfig) -> IpSolution {
        BnbRunner::run(self, config)
    }

    fn fmt_expr(&self, f: &mut fmt::Formatter<'_>, expr: &LinExpr) -> fmt::Result {
        for (i, (var, coef)) in expr.sorted_terms().into_iter().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            let name = self.vars.name(var).unwrap_or("?");
            write!(f, "{coef}[{name}]")?;
        }
        Ok(())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sense {
            Sense::Minimize => write!(f, "min ")?,
            Sense::Maximize => write!(f, "max ")?,
        }
        self.fmt_expr(f, &self.objective)?;
        for constraint in &self.constraints {
            writeln!(f)?;
            self.fmt_expr(f, &constraint.expr)?;
            write!(f, " {} {}", constraint.relation, constraint.rhs)?;
        }
        Ok(())
    }
}
