//! Core trait for immune optimization problems.

use crate::solution::{Gene, Solution};
use rand::Rng;

/// Defines an optimization problem for the immune runners.
///
/// The user provides candidate generation and cost evaluation; the runners
/// handle cloning, hypermutation, replacement and suppression.
///
/// # Minimization
///
/// Lower cost is better. An evaluation that fails should return a sentinel
/// cost (typically `f64::INFINITY`) instead of panicking, so sorting and
/// selection treat it like any other very bad candidate.
///
/// # Determinism
///
/// [`evaluate`](Self::evaluate) should be deterministic: suppression and
/// replacement compare cached costs, and parallel evaluation relies on it
/// for reproducible runs.
///
/// # Examples
///
/// ```ignore
/// struct OneMax { n: usize }
///
/// impl ImmuneProblem for OneMax {
///     type Gene = bool;
///
///     fn dimension(&self) -> usize { self.n }
///
///     fn generate<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
///         (0..self.n).map(|_| rng.random_bool(0.5)).collect()
///     }
///
///     fn evaluate(&self, bits: &[bool]) -> f64 {
///         -(bits.iter().filter(|&&b| b).count() as f64)
///     }
/// }
/// ```
pub trait ImmuneProblem: Send + Sync {
    /// The per-locus representation (`bool` or `f64` out of the box).
    type Gene: Gene;

    /// Number of loci every candidate must have.
    fn dimension(&self) -> usize;

    /// Creates a random candidate of length [`dimension`](Self::dimension).
    ///
    /// Called for the initial population and for every randomly inserted
    /// individual.
    fn generate<R: Rng>(&self, rng: &mut R) -> Vec<Self::Gene>;

    /// Computes the cost of a candidate. Lower is better.
    fn evaluate(&self, values: &[Self::Gene]) -> f64;

    /// External termination predicate, consulted once per iteration.
    ///
    /// `last_improvement` is `Some(amount)` when the previous iteration
    /// improved the best cost and `None` otherwise. The default never
    /// terminates; the config limits still apply.
    fn should_terminate(&self, _last_improvement: Option<f64>, _iteration: usize) -> bool {
        false
    }

    /// Called when the best solution improves.
    fn on_solution_updated(&self, _best: &Solution<Self::Gene>, _iteration: usize) {}

    /// Called at the end of every iteration.
    fn on_stepped(&self, _best: &Solution<Self::Gene>, _iteration: usize) {}
}
