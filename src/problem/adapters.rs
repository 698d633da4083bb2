//! Closure-backed problems.
//!
//! [`BinaryProblem`] and [`ContinuousProblem`] let callers plug plain
//! closures into the runners instead of implementing [`ImmuneProblem`].
//! Both are assembled by a builder whose `build()` refuses to produce a
//! problem without a generator or an evaluator.

use super::bounds::Bounds;
use super::types::ImmuneProblem;
use crate::error::ConfigError;
use crate::solution::Solution;
use rand::{Rng, RngCore};

type TerminateFn = Box<dyn Fn(Option<f64>, usize) -> bool + Send + Sync>;
type ObserverFn<G> = Box<dyn Fn(&Solution<G>, usize) + Send + Sync>;

type BinaryGeneratorFn = Box<dyn Fn(usize, &mut dyn RngCore) -> Vec<bool> + Send + Sync>;
type BinaryEvaluatorFn = Box<dyn Fn(&[bool]) -> f64 + Send + Sync>;

type ContinuousGeneratorFn = Box<dyn Fn(&Bounds, &mut dyn RngCore) -> Vec<f64> + Send + Sync>;
type ContinuousEvaluatorFn = Box<dyn Fn(&[f64], &Bounds) -> f64 + Send + Sync>;

/// Optional hooks shared by both adapters.
struct Hooks<G> {
    terminate: Option<TerminateFn>,
    on_updated: Option<ObserverFn<G>>,
    on_stepped: Option<ObserverFn<G>>,
}

impl<G> Default for Hooks<G> {
    fn default() -> Self {
        Self {
            terminate: None,
            on_updated: None,
            on_stepped: None,
        }
    }
}

impl<G> Hooks<G> {
    fn should_terminate(&self, last_improvement: Option<f64>, iteration: usize) -> bool {
        self.terminate
            .as_ref()
            .is_some_and(|f| f(last_improvement, iteration))
    }

    fn updated(&self, best: &Solution<G>, iteration: usize) {
        if let Some(f) = &self.on_updated {
            f(best, iteration);
        }
    }

    fn stepped(&self, best: &Solution<G>, iteration: usize) {
        if let Some(f) = &self.on_stepped {
            f(best, iteration);
        }
    }
}

// ============================================================================
// Binary
// ============================================================================

/// A bit-vector problem defined by closures.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_immune::problem::BinaryProblem;
///
/// let problem = BinaryProblem::builder(8)
///     .generator(|n, rng| (0..n).map(|_| rng.random_bool(0.5)).collect())
///     .evaluator(|bits| bits.iter().filter(|&&b| b).count() as f64)
///     .build()
///     .unwrap();
/// ```
pub struct BinaryProblem {
    dimension: usize,
    generator: BinaryGeneratorFn,
    evaluator: BinaryEvaluatorFn,
    hooks: Hooks<bool>,
}

impl BinaryProblem {
    /// Starts building a problem over `{0,1}^dimension`.
    pub fn builder(dimension: usize) -> BinaryProblemBuilder {
        BinaryProblemBuilder {
            dimension,
            generator: None,
            evaluator: None,
            hooks: Hooks::default(),
        }
    }
}

/// Builder for [`BinaryProblem`].
pub struct BinaryProblemBuilder {
    dimension: usize,
    generator: Option<BinaryGeneratorFn>,
    evaluator: Option<BinaryEvaluatorFn>,
    hooks: Hooks<bool>,
}

impl BinaryProblemBuilder {
    /// Sets the solution generator. It receives the dimension.
    pub fn generator<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, &mut dyn RngCore) -> Vec<bool> + Send + Sync + 'static,
    {
        self.generator = Some(Box::new(f));
        self
    }

    /// Sets the cost evaluator.
    pub fn evaluator<F>(mut self, f: F) -> Self
    where
        F: Fn(&[bool]) -> f64 + Send + Sync + 'static,
    {
        self.evaluator = Some(Box::new(f));
        self
    }

    /// Sets the external termination predicate.
    pub fn terminate_when<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<f64>, usize) -> bool + Send + Sync + 'static,
    {
        self.hooks.terminate = Some(Box::new(f));
        self
    }

    /// Sets the callback fired when the best solution improves.
    pub fn on_solution_updated<F>(mut self, f: F) -> Self
    where
        F: Fn(&Solution<bool>, usize) + Send + Sync + 'static,
    {
        self.hooks.on_updated = Some(Box::new(f));
        self
    }

    /// Sets the callback fired after every iteration.
    pub fn on_stepped<F>(mut self, f: F) -> Self
    where
        F: Fn(&Solution<bool>, usize) + Send + Sync + 'static,
    {
        self.hooks.on_stepped = Some(Box::new(f));
        self
    }

    /// Finishes the problem.
    ///
    /// Fails if the dimension is zero or the generator or evaluator is
    /// missing.
    pub fn build(self) -> Result<BinaryProblem, ConfigError> {
        if self.dimension == 0 {
            return Err(ConfigError::invalid("dimension", "must be at least 1"));
        }
        let generator = self.generator.ok_or(ConfigError::MissingGenerator)?;
        let evaluator = self.evaluator.ok_or(ConfigError::MissingEvaluator)?;
        Ok(BinaryProblem {
            dimension: self.dimension,
            generator,
            evaluator,
            hooks: self.hooks,
        })
    }
}

impl ImmuneProblem for BinaryProblem {
    type Gene = bool;

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
        let rng: &mut dyn RngCore = rng;
        (self.generator)(self.dimension, rng)
    }

    fn evaluate(&self, values: &[bool]) -> f64 {
        (self.evaluator)(values)
    }

    fn should_terminate(&self, last_improvement: Option<f64>, iteration: usize) -> bool {
        self.hooks.should_terminate(last_improvement, iteration)
    }

    fn on_solution_updated(&self, best: &Solution<bool>, iteration: usize) {
        self.hooks.updated(best, iteration);
    }

    fn on_stepped(&self, best: &Solution<bool>, iteration: usize) {
        self.hooks.stepped(best, iteration);
    }
}

// ============================================================================
// Continuous
// ============================================================================

/// A real-vector problem defined by closures over a bounded box.
///
/// The dimension is taken from the bounds. Both the generator and the
/// evaluator receive the bounds.
///
/// # Examples
///
/// ```
/// use u_immune::problem::{Bounds, ContinuousProblem};
///
/// let bounds = Bounds::uniform(3, -5.0, 5.0).unwrap();
/// let problem = ContinuousProblem::builder(bounds)
///     .generator(|b, rng| b.sample_uniform(rng))
///     .evaluator(|x, _| x.iter().map(|v| v * v).sum())
///     .build()
///     .unwrap();
/// ```
pub struct ContinuousProblem {
    bounds: Bounds,
    generator: ContinuousGeneratorFn,
    evaluator: ContinuousEvaluatorFn,
    hooks: Hooks<f64>,
}

impl ContinuousProblem {
    /// Starts building a problem over the given box.
    pub fn builder(bounds: Bounds) -> ContinuousProblemBuilder {
        ContinuousProblemBuilder {
            bounds,
            generator: None,
            evaluator: None,
            hooks: Hooks::default(),
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }
}

/// Builder for [`ContinuousProblem`].
pub struct ContinuousProblemBuilder {
    bounds: Bounds,
    generator: Option<ContinuousGeneratorFn>,
    evaluator: Option<ContinuousEvaluatorFn>,
    hooks: Hooks<f64>,
}

impl ContinuousProblemBuilder {
    /// Sets the solution generator.
    pub fn generator<F>(mut self, f: F) -> Self
    where
        F: Fn(&Bounds, &mut dyn RngCore) -> Vec<f64> + Send + Sync + 'static,
    {
        self.generator = Some(Box::new(f));
        self
    }

    /// Sets the cost evaluator.
    pub fn evaluator<F>(mut self, f: F) -> Self
    where
        F: Fn(&[f64], &Bounds) -> f64 + Send + Sync + 'static,
    {
        self.evaluator = Some(Box::new(f));
        self
    }

    /// Sets the external termination predicate.
    pub fn terminate_when<F>(mut self, f: F) -> Self
    where
        F: Fn(Option<f64>, usize) -> bool + Send + Sync + 'static,
    {
        self.hooks.terminate = Some(Box::new(f));
        self
    }

    /// Sets the callback fired when the best solution improves.
    pub fn on_solution_updated<F>(mut self, f: F) -> Self
    where
        F: Fn(&Solution<f64>, usize) + Send + Sync + 'static,
    {
        self.hooks.on_updated = Some(Box::new(f));
        self
    }

    /// Sets the callback fired after every iteration.
    pub fn on_stepped<F>(mut self, f: F) -> Self
    where
        F: Fn(&Solution<f64>, usize) + Send + Sync + 'static,
    {
        self.hooks.on_stepped = Some(Box::new(f));
        self
    }

    /// Finishes the problem. Fails if the generator or evaluator is missing.
    pub fn build(self) -> Result<ContinuousProblem, ConfigError> {
        let generator = self.generator.ok_or(ConfigError::MissingGenerator)?;
        let evaluator = self.evaluator.ok_or(ConfigError::MissingEvaluator)?;
        Ok(ContinuousProblem {
            bounds: self.bounds,
            generator,
            evaluator,
            hooks: self.hooks,
        })
    }
}

impl ImmuneProblem for ContinuousProblem {
    type Gene = f64;

    fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Vec<f64> {
        let rng: &mut dyn RngCore = rng;
        (self.generator)(&self.bounds, rng)
    }

    fn evaluate(&self, values: &[f64]) -> f64 {
        (self.evaluator)(values, &self.bounds)
    }

    fn should_terminate(&self, last_improvement: Option<f64>, iteration: usize) -> bool {
        self.hooks.should_terminate(last_improvement, iteration)
    }

    fn on_solution_updated(&self, best: &Solution<f64>, iteration: usize) {
        self.hooks.updated(best, iteration);
    }

    fn on_stepped(&self, best: &Solution<f64>, iteration: usize) {
        self.hooks.stepped(best, iteration);
    }
}
