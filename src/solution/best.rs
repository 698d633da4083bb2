//! Best-solution tracker.

use super::gene::Gene;
use super::types::{compare_costs, Solution};
use std::cmp::Ordering;

/// The best solution seen during a run.
///
/// The tracked state only changes through [`try_update`](Self::try_update),
/// which replaces it iff the challenger is strictly better. Observers get
/// `&Solution` views and cannot change it.
#[derive(Debug, Clone)]
pub struct BestSolution<G> {
    current: Solution<G>,
}

impl<G: Gene> BestSolution<G> {
    /// Starts tracking from an already evaluated solution.
    pub fn new(initial: Solution<G>) -> Self {
        Self { current: initial }
    }

    /// Starts tracking from the lowest-cost member of `population`.
    ///
    /// Returns `None` for an empty population. Among equal costs the first
    /// one wins.
    pub fn from_population(population: &[Solution<G>]) -> Option<Self> {
        population
            .iter()
            .min_by(|a, b| compare_costs(a.cost(), b.cost()))
            .map(|b| Self::new(b.clone()))
    }

    /// Replaces the tracked solution iff `cost` is strictly lower.
    ///
    /// Returns the improvement `old_cost - cost` when the tracker changed,
    /// `None` otherwise (ties included). A NaN cost ranks as worst: it never
    /// replaces anything, and any other cost replaces it.
    pub fn try_update(&mut self, values: &[G], cost: f64) -> Option<f64> {
        if compare_costs(cost, self.current.cost()) == Ordering::Less {
            let old = self.current.cost();
            let improvement = if old.is_nan() { f64::INFINITY } else { old - cost };
            self.current = Solution::with_cost(values.to_vec(), cost);
            Some(improvement)
        } else {
            None
        }
    }

    /// The tracked solution.
    pub fn solution(&self) -> &Solution<G> {
        &self.current
    }

    /// The tracked cost.
    pub fn cost(&self) -> f64 {
        self.current.cost()
    }

    /// Consumes the tracker, returning the best solution.
    pub fn into_solution(self) -> Solution<G> {
        self.current
    }
}
