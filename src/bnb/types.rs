//! Result surface of a branch-and-bound solve.

use std::collections::HashMap;
use std::fmt;

/// Final verdict of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// An optimal integer solution was found.
    Optimal,
    /// No integer point satisfies all constraints.
    Infeasible,
    /// Some subproblem relaxation is unbounded; the search was aborted.
    Unbounded,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Solution of an integer linear program.
#[derive(Debug, Clone)]
pub struct IpSolution {
    /// Verdict of the search.
    pub status: SolveStatus,

    /// Optimal objective value: finite on [`SolveStatus::Optimal`], `±∞`
    /// on [`SolveStatus::Unbounded`], NaN on [`SolveStatus::Infeasible`].
    pub extremum: f64,

    /// Variable assignment by name; empty unless optimal.
    pub solution: HashMap<String, i64>,

    /// Number of LP relaxations evaluated during the search.
    pub nodes_solved: u64,
}

impl IpSolution {
    /// Whether an optimal integer solution was found.
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// The assigned value of a variable, if one was found.
    pub fn value(&self, name: &str) -> Option<i64> {
        self.solution.get(name).copied()
    }
}

impl fmt::Display for IpSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {}", self.status)?;
        writeln!(f, "extremum: {}", self.extremum)?;
        let mut names: Vec<&String> = self.solution.keys().collect();
        names.sort();
        for name in names {
            writeln!(f, "  {name} = {}", self.solution[name])?;
        }
        write!(f, "nodes solved: {}", self.nodes_solved)
    }
}
