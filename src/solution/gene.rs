//! Per-locus representation capability.

use crate::random::standard_normal;
use rand::Rng;

/// A single locus of a candidate solution.
///
/// The runners never look inside a gene. They only need to:
///
/// - copy it (clones never alias their parent),
/// - compare it by value (network suppression counts mismatching loci),
/// - perturb it in place with a given strength.
///
/// Built-in implementations:
///
/// | Gene   | Mutation                          |
/// |--------|-----------------------------------|
/// | `bool` | flip; `strength` is ignored       |
/// | `f64`  | `x += N(0, 1) * strength`         |
pub trait Gene: Copy + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Perturbs this locus in place.
    fn mutate<R: Rng + ?Sized>(&mut self, strength: f64, rng: &mut R);
}

impl Gene for bool {
    fn mutate<R: Rng + ?Sized>(&mut self, _strength: f64, _rng: &mut R) {
        *self = !*self;
    }
}

impl Gene for f64 {
    fn mutate<R: Rng + ?Sized>(&mut self, strength: f64, rng: &mut R) {
        *self += standard_normal(rng) * strength;
    }
}
