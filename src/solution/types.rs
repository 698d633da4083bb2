//! The candidate solution container.

use super::gene::Gene;
use rand::Rng;
use std::cmp::Ordering;

/// Orders two costs ascending.
///
/// NaN ranks together with `f64::INFINITY`, i.e. as the worst possible cost,
/// which makes this a total order usable by sorts, selection and
/// suppression alike.
pub fn compare_costs(a: f64, b: f64) -> Ordering {
    let rank = |c: f64| if c.is_nan() { f64::INFINITY } else { c };
    rank(a).partial_cmp(&rank(b)).unwrap_or(Ordering::Equal)
}

/// A candidate point and its cached cost.
///
/// The dimension is fixed at construction: no method adds or removes
/// loci. `cost` is whatever the runner last assigned; mutation does not
/// touch it, so a freshly mutated solution carries a stale cost until it
/// is re-evaluated.
///
/// Lower cost is better. `f64::INFINITY` marks an unevaluated or invalid
/// candidate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution<G> {
    values: Vec<G>,
    cost: f64,
}

impl<G: Gene> Solution<G> {
    /// Creates an unevaluated solution (cost = `f64::INFINITY`).
    pub fn new(values: Vec<G>) -> Self {
        Self {
            values,
            cost: f64::INFINITY,
        }
    }

    /// Creates a solution with a known cost.
    pub fn with_cost(values: Vec<G>, cost: f64) -> Self {
        Self { values, cost }
    }

    /// The loci of this solution.
    pub fn values(&self) -> &[G] {
        &self.values
    }

    /// Consumes the solution, returning its loci.
    pub fn into_values(self) -> Vec<G> {
        self.values
    }

    /// The cached cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Assigns the cost. Called by the runners after evaluation.
    pub fn set_cost(&mut self, cost: f64) {
        self.cost = cost;
    }

    /// Number of loci.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the solution has no loci.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mutates the locus at `index` with the given strength.
    ///
    /// # Panics
    /// Panics if `index >= self.len()`.
    pub fn mutate_at<R: Rng + ?Sized>(&mut self, index: usize, strength: f64, rng: &mut R) {
        self.values[index].mutate(strength, rng);
    }

    /// Point mutation: every locus independently mutates with probability
    /// `rate`.
    ///
    /// One uniform draw is consumed per locus whatever the outcome, so the
    /// RNG stream position after the call depends only on the dimension and
    /// the number of loci that actually mutated. A `rate` of zero (or
    /// below, or NaN) never mutates anything.
    ///
    /// Returns the number of loci that were mutated.
    pub fn point_mutate<R: Rng + ?Sized>(&mut self, rate: f64, strength: f64, rng: &mut R) -> usize {
        let mut mutated = 0;
        for gene in self.values.iter_mut() {
            if rng.random::<f64>() < rate {
                gene.mutate(strength, rng);
                mutated += 1;
            }
        }
        mutated
    }

    /// Number of loci whose values differ (exact inequality).
    ///
    /// Loci beyond the shorter of the two solutions are counted as
    /// mismatches.
    pub fn mismatch_count(&self, other: &Self) -> usize {
        let common = self
            .values
            .iter()
            .zip(other.values.iter())
            .filter(|(a, b)| a != b)
            .count();
        common + self.len().abs_diff(other.len())
    }
}
