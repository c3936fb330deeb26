//! Solver configuration.

/// Configuration for a branch-and-bound solve.
///
/// Both toggles default to off: a plain scalar, single-threaded solve.
///
/// # Examples
///
/// ```
/// use intlp::bnb::SolveConfig;
///
/// let config = SolveConfig::default()
///     .with_vectorized(true)
///     .with_parallel(true);
/// ```
#[derive(Debug, Clone)]
pub struct SolveConfig {
    /// Use the four-lane chunked row-elimination kernel.
    pub vectorized: bool,

    /// Evaluate subproblem LPs on a worker pool.
    pub parallel: bool,

    /// Worker count for the parallel driver. `0` sizes the pool to the
    /// machine's logical processor count. Ignored when `parallel` is off.
    pub num_threads: usize,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            vectorized: false,
            parallel: false,
            num_threads: 0,
        }
    }
}

impl SolveConfig {
    pub fn with_vectorized(mut self, vectorized: bool) -> Self {
        self.vectorized = vectorized;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.num_threads > 0 && !self.parallel {
            return Err("num_threads requires parallel to be enabled".into());
        }
        Ok(())
    }
}
