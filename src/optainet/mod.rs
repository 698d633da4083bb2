//! Optimization Artificial Immune Network (Opt-aiNet).
//!
//! A variable-size network of antibodies searches for many optima at
//! once. Every iteration:
//!
//! 1. Each antibody produces `num_clones` clones, mutated with rate
//!    `(1 / beta) * exp(-affinity)`. The whole progeny pool is regenerated
//!    until its mean cost is strictly below the population mean (bounded by
//!    `max_progeny_attempts`).
//! 2. [`suppress`] keeps only the best member of every neighbourhood of
//!    radius `aff_threshold`, measured by [`mismatch_distance`].
//! 3. `random_inserted` newcomers join, and the network is sorted.
//!
//! The final [`ImmuneResult::population`](crate::driver::ImmuneResult) is
//! the set of distinct optima the network settled on.
//!
//! # References
//!
//! - de Castro & Timmis (2002), "An Artificial Immune Network for
//!   Multimodal Function Optimization", *Proc. IEEE CEC 2002*, 699–704
//! - Brownlee (2011), *Clever Algorithms*, "Optimization Artificial Immune
//!   Network"

mod config;
mod runner;
mod suppression;

pub use config::OptAiNetConfig;
pub use runner::OptAiNetRunner;
pub use suppression::{mismatch_distance, suppress};
