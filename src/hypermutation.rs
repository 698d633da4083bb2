//! Clone-and-hypermutate operator.
//!
//! Clonal selection proliferates a parent into several copies and then
//! mutates every copy independently. Each locus of each clone mutates with
//! probability `rate`; the perturbation size is `strength` (normal standard
//! deviation for real genes, ignored for bits).
//!
//! Clones come back with the parent's cost still attached. The runners
//! re-evaluate them before they are compared with anything.

use crate::solution::{Gene, Solution};
use rand::Rng;

/// Produces `num_clones` independently hypermutated copies of `parent`.
///
/// RNG draws happen clone by clone, locus by locus, so a fixed seed yields
/// the same clones.
pub fn clone_and_hypermutate<G: Gene, R: Rng + ?Sized>(
    parent: &Solution<G>,
    num_clones: usize,
    rate: f64,
    strength: f64,
    rng: &mut R,
) -> Vec<Solution<G>> {
    (0..num_clones)
        .map(|_| {
            let mut clone = parent.clone();
            clone.point_mutate(rate, strength, rng);
            clone
        })
        .collect()
}
