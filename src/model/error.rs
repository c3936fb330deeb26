//! Model construction errors.

use thiserror::Error;

/// Errors raised while parsing problem-construction input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Objective sense string was neither `"min"` nor `"max"`.
    #[error("unknown objective sense `{0}` (expected \"min\" or \"max\")")]
    UnknownSense(String),

    /// Relation string was none of `"<="`, `"="`, `">="`.
    #[error("unknown constraint relation `{0}` (expected \"<=\", \"=\" or \">=\")")]
    UnknownRelation(String),
}
