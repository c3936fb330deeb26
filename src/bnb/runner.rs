//! Serial and parallel branch-and-bound drivers.
//!
//! Both drivers share [`Search`]: the open-node min-heap, the global
//! incumbent upper bound, the verdict so far, and the LP-solve counter.
//! The parallel driver wraps the whole of it in a single mutex (the one
//! critical section) and runs the LP relaxations of popped nodes outside
//! it on a fixed pool of symmetric workers. A `working` counter keeps
//! idle workers spinning while any peer may still produce new nodes, so
//! the pool only drains once the queue is empty *and* nothing is in
//! flight.

use super::config::SolveConfig;
use super::node::{Node, NodeKind};
use super::types::{IpSolution, SolveStatus};
use crate::lp::VarBounds;
use crate::model::{Constraint, LinExpr, Problem, Sense};
use std::collections::{BinaryHeap, HashMap};
use std::sync::Mutex;
use tracing::debug;

/// Shared search state. Mutated serially, or under the critical section.
struct Search {
    queue: BinaryHeap<Node>,
    upper_bound: f64,
    incumbent: Vec<f64>,
    status: SolveStatus,
    working: u32,
    nodes_solved: u64,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            queue: BinaryHeap::new(),
            upper_bound: f64::INFINITY,
            incumbent: Vec::new(),
            status: SolveStatus::Infeasible,
            working: 0,
            nodes_solved: 0,
        }
    }
}

impl Search {
    /// Routes a freshly evaluated node: updates the incumbent, enqueues,
    /// prunes, or records the unbounded verdict.
    ///
    /// The upper bound only ever decreases here, so enqueue-time pruning
    /// stays valid for the rest of the search.
    fn check_node(&mut self, node: Node) {
        self.nodes_solved += 1;
        match node.kind {
            NodeKind::IpFeasible => {
                if node.lower_bound < self.upper_bound {
                    self.upper_bound = node.lower_bound;
                    self.incumbent = node.solution;
                    self.status = SolveStatus::Optimal;
                    debug!(upper_bound = self.upper_bound, "incumbent improved");
                }
            }
            NodeKind::LpFeasible => {
                if node.lower_bound < self.upper_bound {
                    self.queue.push(node);
                }
            }
            NodeKind::Unbounded => {
                self.status = SolveStatus::Unbounded;
            }
            NodeKind::Infeasible => {}
        }
    }
}

/// Executes the branch-and-bound search for a [`Problem`].
///
/// # Usage
///
/// ```
/// use intlp::bnb::{BnbRunner, SolveConfig};
/// use intlp::model::{Problem, Relation};
///
/// let mut problem = Problem::maximize(&[(5.0, "x"), (4.0, "y")]);
/// problem.add_constraint(&[(6.0, "x"), (4.0, "y")], Relation::Leq, 23.0);
/// let solution = BnbRunner::run(&problem, &SolveConfig::default());
/// assert!((solution.extremum - 21.0).abs() < 1e-6);
/// ```
pub struct BnbRunner;

impl BnbRunner {
    /// Runs the search with the given configuration.
    ///
    /// # Panics
    /// Panics if the configuration is invalid (call [`SolveConfig::validate`]
    /// first to get a descriptive error).
    pub fn run(problem: &Problem, config: &SolveConfig) -> IpSolution {
        config.validate().expect("invalid SolveConfig");
        let minimize = problem.sense == Sense::Minimize;
        // The drivers below always minimise; a maximise objective is
        // negated here and the extremum sign restored at the end.
        let objective = if minimize {
            problem.objective.clone()
        } else {
            problem.objective.negated()
        };

        let mut search = Search::default();
        let root = vec![VarBounds::nonneg(); problem.var_count()];
        search.check_node(Node::evaluate(
            &objective,
            &problem.constraints,
            root,
            config.vectorized,
        ));

        if config.parallel {
            drive_parallel(&objective, &problem.constraints, config, &mut search);
        } else {
            drive_serial(&objective, &problem.constraints, config, &mut search);
        }
        debug!(
            nodes = search.nodes_solved,
            status = %search.status,
            "search finished"
        );

        into_solution(search, problem, minimize)
    }
}

fn drive_serial(
    objective: &LinExpr,
    constraints: &[Constraint],
    config: &SolveConfig,
    search: &mut Search,
) {
    while search.status != SolveStatus::Unbounded {
        let Some(node) = search.queue.pop() else {
            break;
        };
        let left = Node::evaluate(objective, constraints, node.left, config.vectorized);
        let right = Node::evaluate(objective, constraints, node.right, config.vectorized);
        search.check_node(left);
        search.check_node(right);
    }
}

fn drive_parallel(
    objective: &LinExpr,
    constraints: &[Constraint],
    config: &SolveConfig,
    search: &mut Search,
) {
    let threads = if config.num_threads == 0 {
        rayon::current_num_threads()
    } else {
        config.num_threads
    };
    let shared = Mutex::new(std::mem::take(search));
    rayon::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|_| worker(&shared, objective, constraints, config.vectorized));
        }
    });
    *search = shared.into_inner().expect("search state lock poisoned");
}

/// One symmetric worker of the parallel driver.
fn worker(
    shared: &Mutex<Search>,
    objective: &LinExpr,
    constraints: &[Constraint],
    vectorized: bool,
) {
    loop {
        let claimed = {
            let mut search = shared.lock().expect("search state lock poisoned");
            if search.status == SolveStatus::Unbounded {
                return;
            }
            // Pop until a node survives late pruning: the incumbent may
            // have improved since the node was enqueued.
            let mut picked = None;
            while let Some(node) = search.queue.pop() {
                if node.lower_bound < search.upper_bound {
                    picked = Some(node);
                    break;
                }
            }
            match picked {
                Some(node) => {
                    search.working += 1;
                    Some(node)
                }
                None if search.working > 0 => None,
                None => return,
            }
        };

        let Some(node) = claimed else {
            // Queue momentarily empty while a peer still expands a node.
            std::thread::yield_now();
            continue;
        };

        // LP solves happen outside the critical section; each worker owns
        // its tableaus.
        let left = Node::evaluate(objective, constraints, node.left, vectorized);
        let right = Node::evaluate(objective, constraints, node.right, vectorized);

        let mut search = shared.lock().expect("search state lock poisoned");
        search.check_node(left);
        search.check_node(right);
        search.working -= 1;
    }
}

fn into_solution(search: Search, problem: &Problem, minimize: bool) -> IpSolution {
    let sign = if minimize { 1.0 } else { -1.0 };
    match search.status {
        SolveStatus::Optimal => {
            let mut solution = HashMap::with_capacity(search.incumbent.len());
            for (name, &value) in problem.vars().iter().zip(&search.incumbent) {
                solution.insert(name.to_string(), value.round() as i64);
            }
            IpSolution {
                status: SolveStatus::Optimal,
                extremum: search.upper_bound * sign,
                solution,
                nodes_solved: search.nodes_solved,
            }
        }
        SolveStatus::Infeasible => IpSolution {
            status: SolveStatus::Infeasible,
            extremum: f64::NAN,
            solution: HashMap::new(),
            nodes_solved: search.nodes_solved,
        },
        SolveStatus::Unbounded => IpSolution {
            status: SolveStatus::Unbounded,
            extremum: sign * f64::INFINITY,
            solution: HashMap::new(),
            nodes_solved: search.nodes_solved,
        },
    }
}
