//! Linear constraints and rhs sign-normalisation.

use super::error::ModelError;
use super::expr::LinExpr;
use std::fmt;
use std::str::FromStr;

/// Comparison relation of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `… <= rhs`
    Leq,
    /// `… = rhs`
    Eq,
    /// `… >= rhs`
    Geq,
}

impl Relation {
    /// The relation obtained by negating both sides of the constraint.
    pub fn flipped(self) -> Self {
        match self {
            Relation::Leq => Relation::Geq,
            Relation::Eq => Relation::Eq,
            Relation::Geq => Relation::Leq,
        }
    }
}

impl FromStr for Relation {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(Relation::Leq),
            "=" => Ok(Relation::Eq),
            ">=" => Ok(Relation::Geq),
            other => Err(ModelError::UnknownRelation(other.to_string())),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Leq => write!(f, "<="),
            Relation::Eq => write!(f, "="),
            Relation::Geq => write!(f, ">="),
        }
    }
}

/// A linear constraint `expr ⟨relation⟩ rhs`.
///
/// After [`normalize_rhs`](Constraint::normalize_rhs) the right-hand side
/// is non-negative; the tableau construction relies on this invariant.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub expr: LinExpr,
    pub relation: Relation,
    pub rhs: f64,
}

impl Constraint {
    /// Creates a constraint.
    ///
    /// # Panics
    /// Panics if `rhs` is not finite.
    pub fn new(expr: LinExpr, relation: Relation, rhs: f64) -> Self {
        assert!(rhs.is_finite(), "constraint rhs must be finite, got {rhs}");
        Self { expr, relation, rhs }
    }

    /// Negates both sides when the rhs is negative, flipping the relation.
    ///
    /// Idempotent: the rhs is non-negative afterwards, so a second call is
    /// a no-op.
    pub fn normalize_rhs(&mut self) {
        if self.rhs >= 0.0 {
            return;
        }
        self.rhs = -self.rhs;
        self.expr.negate();
        self.relation = self.relation.flipped();
    }

    /// Whether standard form adds a slack column for this constraint.
    pub fn has_slack(&self) -> bool {
        self.relation != Relation::Eq
    }

    /// Slack-column coefficient: `+1` for `<=`, `−1` for `>=`, `0` for `=`.
    pub fn slack_coef(&self) -> f64 {
        match self.relation {
            Relation::Leq => 1.0,
            Relation::Geq => -1.0,
            Relation::Eq => 0.0,
        }
    }

    /// Whether phase 1 needs an artificial variable for this row.
    ///
    /// Only a `<=` row gets an identity basic column from its `+1` slack;
    /// `=` and `>=` rows start without one.
    pub fn needs_artificial(&self) -> bool {
        self.relation != Relation::Leq
    }
}
