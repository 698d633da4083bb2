//! Affinity model: cost normalization and mutation-rate mapping.
//!
//! Both immune algorithms turn raw costs into a per-individual score and
//! then map the score to a mutation rate:
//!
//! ```text
//! range    = worst - best
//! score[i] = 1.0                      if range == 0 (or non-finite)
//!          = 1.0 - cost[i] / range    otherwise
//! ```
//!
//! The score is a ratio against the *range*, not a min-max normalization.
//! Costs larger than the range, or negative costs, produce scores outside
//! `[0, 1]`, and that directly changes the mutation rate. Callers rely on
//! this exact shape.
//!
//! # Mutation-rate mappings
//!
//! - ClonAlg: `rate = exp(mutation_factor * score)` with a negative
//!   `mutation_factor` (default −2.5).
//! - Opt-aiNet: `rate = (1 / beta) * exp(-score)` (default `beta` = 100).
//!   The real-valued Opt-aiNet also uses this value as the standard
//!   deviation of the perturbation.
//!
//! # References
//!
//! - de Castro & Von Zuben (2002), "Learning and Optimization Using the
//!   Clonal Selection Principle", *IEEE Trans. Evol. Comput.* 6(3)
//! - de Castro & Timmis (2002), "An Artificial Immune Network for
//!   Multimodal Function Optimization", CEC 2002

use crate::solution::{Gene, Solution};

/// Default ClonAlg mutation factor.
pub const DEFAULT_MUTATION_FACTOR: f64 = -2.5;

/// Default Opt-aiNet `beta`.
pub const DEFAULT_BETA: f64 = 100.0;

/// Normalizes `costs` against the range `worst - best`.
///
/// A zero range (every cost identical) gives every individual a score of
/// exactly `1.0`. A non-finite range, which happens when the population
/// holds an `INFINITY` sentinel cost, is treated the same way.
pub fn normalize(costs: &[f64], best: f64, worst: f64) -> Vec<f64> {
    let range = worst - best;
    if range == 0.0 || !range.is_finite() {
        return vec![1.0; costs.len()];
    }
    costs.iter().map(|&c| 1.0 - c / range).collect()
}

/// Affinity scores for a population sorted ascending by cost.
///
/// The first element is taken as the best and the last as the worst.
/// An empty population yields an empty vector.
pub fn population_affinity<G: Gene>(population: &[Solution<G>]) -> Vec<f64> {
    let (Some(best), Some(worst)) = (population.first(), population.last()) else {
        return Vec::new();
    };
    let costs: Vec<f64> = population.iter().map(Solution::cost).collect();
    normalize(&costs, best.cost(), worst.cost())
}

/// ClonAlg mutation rate: `exp(mutation_factor * score)`.
///
/// With a negative factor, better individuals (higher score) mutate less.
pub fn clonal_mutation_rate(score: f64, mutation_factor: f64) -> f64 {
    (mutation_factor * score).exp()
}

/// Opt-aiNet mutation rate: `(1 / beta) * exp(-score)`.
pub fn network_mutation_rate(score: f64, beta: f64) -> f64 {
    (1.0 / beta) * (-score).exp()
}
