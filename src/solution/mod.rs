//! Candidate solutions and best-solution bookkeeping.
//!
//! - [`Gene`]: the per-locus capability set (mutation, equality-by-value)
//!   that lets one engine serve both binary and real-valued searches.
//! - [`Solution`]: a fixed-dimension vector of genes with a cached cost.
//! - [`BestSolution`]: the compare-and-replace tracker for the best point
//!   seen during a run.

mod best;
mod gene;
mod types;

pub use best::BestSolution;
pub use gene::Gene;
pub use types::{compare_costs, Solution};
