//! Ready-made problem families for tests and benchmarks.

mod supply_chain;

pub use supply_chain::{build_supply_chain, make_params, supply_chain, ScConfig, ScParams};
