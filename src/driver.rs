//! Run bookkeeping shared by the immune runners.
//!
//! The runners own their population logic; everything else about a run
//! lives here: the termination contract, cost evaluation (sequential or
//! rayon-backed), best-solution tracking with its notifications, and the
//! final [`ImmuneResult`].

use crate::error::ConfigError;
use crate::problem::ImmuneProblem;
use crate::solution::{compare_costs, BestSolution, Gene, Solution};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// `max_iterations` was reached.
    MaxIterations,
    /// `time_limit_ms` elapsed.
    TimeLimit,
    /// `stagnation_limit` iterations passed without improvement.
    Stagnation,
    /// The cancellation token was set.
    Cancelled,
    /// The problem's `should_terminate` predicate returned `true`.
    Terminated,
}

/// Result of an immune optimization run.
#[derive(Debug, Clone)]
pub struct ImmuneResult<G> {
    /// The best solution found during the entire run.
    pub best: Solution<G>,

    /// Cost of the best solution (same as `best.cost()`).
    pub best_cost: f64,

    /// Number of completed iterations.
    pub iterations: usize,

    /// The condition that ended the run.
    pub stop_reason: StopReason,

    /// Best cost after initialization and after every iteration.
    ///
    /// Non-increasing by construction.
    pub cost_history: Vec<f64>,

    /// Final population, sorted ascending by cost.
    ///
    /// For Opt-aiNet this is the network of surviving local optima plus the
    /// last random insertions.
    pub population: Vec<Solution<G>>,

    /// Total number of cost-function calls.
    pub evaluations: usize,
}

/// Termination limits taken from a runner config.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    /// 0 = no limit.
    pub max_iterations: usize,
    /// 0 = disabled.
    pub stagnation_limit: usize,
    pub time_limit_ms: Option<u64>,
}

/// Largest number of candidates a single batch may hold.
pub(crate) const MAX_BATCH: usize = isize::MAX as usize / std::mem::size_of::<Solution<f64>>();

/// Size of a pool of `parents * clones` candidates plus `extra`, or `None`
/// if it exceeds [`MAX_BATCH`].
pub(crate) fn pool_size(parents: usize, clones: usize, extra: usize) -> Option<usize> {
    parents
        .checked_mul(clones)
        .and_then(|n| n.checked_add(extra))
        .filter(|&n| n <= MAX_BATCH)
}

/// Sorts a population ascending by cost.
///
/// The sort is stable: equal costs keep their relative order, which is what
/// makes truncation and suppression tie-breaking deterministic. NaN costs
/// sort last, next to `f64::INFINITY`.
pub(crate) fn sort_by_cost<G: Gene>(population: &mut [Solution<G>]) {
    population.sort_by(|a, b| compare_costs(a.cost(), b.cost()));
}

/// Mean cost of a population. `NaN` for an empty one.
pub(crate) fn mean_cost<G: Gene>(population: &[Solution<G>]) -> f64 {
    population.iter().map(Solution::cost).sum::<f64>() / population.len() as f64
}

/// Per-run state: best tracker, iteration counter and termination inputs.
pub(crate) struct Driver<'a, P: ImmuneProblem> {
    problem: &'a P,
    limits: Limits,
    parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
    started: Instant,
    best: BestSolution<P::Gene>,
    iteration: usize,
    last_improvement: Option<f64>,
    stagnation: usize,
    evaluations: usize,
    cost_history: Vec<f64>,
}

impl<'a, P: ImmuneProblem> Driver<'a, P> {
    /// Generates and evaluates the initial population and starts tracking
    /// its best member.
    ///
    /// Returns the driver together with the (unsorted) initial population.
    /// Fails with [`ConfigError::EmptyPopulation`] when `size` is zero.
    pub fn start<R: Rng>(
        problem: &'a P,
        limits: Limits,
        parallel: bool,
        cancel: Option<Arc<AtomicBool>>,
        size: usize,
        rng: &mut R,
    ) -> Result<(Self, Vec<Solution<P::Gene>>), ConfigError> {
        let started = Instant::now();
        let mut initial = generate_batch(problem, size, rng)?;
        evaluate_batch(problem, &mut initial, parallel);
        let best = BestSolution::from_population(&initial).ok_or(ConfigError::EmptyPopulation)?;

        let driver = Self {
            problem,
            limits,
            parallel,
            cancel,
            started,
            cost_history: vec![best.cost()],
            best,
            iteration: 0,
            last_improvement: None,
            stagnation: 0,
            evaluations: initial.len(),
        };
        Ok((driver, initial))
    }

    /// Generates `count` candidates and evaluates them.
    ///
    /// All generation happens before any evaluation so the RNG stream does
    /// not depend on whether evaluation runs in parallel.
    pub fn spawn<R: Rng>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Solution<P::Gene>>, ConfigError> {
        let mut batch = generate_batch(self.problem, count, rng)?;
        self.evaluate(&mut batch);
        Ok(batch)
    }

    /// Evaluates every solution in `batch` and stores the cost.
    pub fn evaluate(&mut self, batch: &mut [Solution<P::Gene>]) {
        evaluate_batch(self.problem, batch, self.parallel);
        self.evaluations += batch.len();
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn best_cost(&self) -> f64 {
        self.best.cost()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Checks the termination conditions in a fixed order and returns the
    /// first one that fires.
    pub fn stop_reason(&self) -> Option<StopReason> {
        if self.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        if self.limits.max_iterations > 0 && self.iteration >= self.limits.max_iterations {
            return Some(StopReason::MaxIterations);
        }
        if let Some(ms) = self.limits.time_limit_ms {
            if self.started.elapsed().as_millis() >= u128::from(ms) {
                return Some(StopReason::TimeLimit);
            }
        }
        if self.limits.stagnation_limit > 0 && self.stagnation >= self.limits.stagnation_limit {
            return Some(StopReason::Stagnation);
        }
        if self
            .problem
            .should_terminate(self.last_improvement, self.iteration)
        {
            return Some(StopReason::Terminated);
        }
        None
    }

    /// Closes an iteration: offers the leader of the new (sorted) population
    /// to the tracker, fires the notifications and advances the counter.
    ///
    /// An empty population still counts as an iteration without
    /// improvement.
    pub fn record(&mut self, population: &[Solution<P::Gene>]) {
        self.last_improvement = population
            .first()
            .and_then(|leader| self.best.try_update(leader.values(), leader.cost()));
        if self.last_improvement.is_some() {
            self.stagnation = 0;
            self.problem
                .on_solution_updated(self.best.solution(), self.iteration);
        } else {
            self.stagnation += 1;
        }
        self.problem.on_stepped(self.best.solution(), self.iteration);
        self.cost_history.push(self.best.cost());

        debug!(
            iteration = self.iteration,
            best_cost = self.best.cost(),
            improvement = ?self.last_improvement,
            population_size = population.len(),
            "iteration complete"
        );
        self.iteration += 1;
    }

    /// Packages the final result.
    pub fn finish(
        self,
        population: Vec<Solution<P::Gene>>,
        stop_reason: StopReason,
    ) -> ImmuneResult<P::Gene> {
        let best = self.best.into_solution();
        ImmuneResult {
            best_cost: best.cost(),
            best,
            iterations: self.iteration,
            stop_reason,
            cost_history: self.cost_history,
            population,
            evaluations: self.evaluations,
        }
    }
}

/// Generates `count` candidates, checking each against the declared
/// dimension. The candidates are not evaluated.
fn generate_batch<P: ImmuneProblem, R: Rng>(
    problem: &P,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Solution<P::Gene>>, ConfigError> {
    let expected = problem.dimension();
    let mut batch = Vec::with_capacity(count);
    for _ in 0..count {
        let values = problem.generate(rng);
        if values.len() != expected {
            return Err(ConfigError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        batch.push(Solution::new(values));
    }
    Ok(batch)
}

#[cfg(feature = "parallel")]
fn evaluate_batch<P: ImmuneProblem>(problem: &P, batch: &mut [Solution<P::Gene>], parallel: bool) {
    use rayon::prelude::*;

    if parallel {
        batch.par_iter_mut().for_each(|s| {
            let cost = problem.evaluate(s.values());
            s.set_cost(cost);
        });
    } else {
        for s in batch.iter_mut() {
            let cost = problem.evaluate(s.values());
            s.set_cost(cost);
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_batch<P: ImmuneProblem>(problem: &P, batch: &mut [Solution<P::Gene>], _parallel: bool) {
    for s in batch.iter_mut() {
        let cost = problem.evaluate(s.values());
        s.set_cost(cost);
    }
}
