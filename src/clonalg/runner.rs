//! ClonAlg execution loop.
//!
//! [`ClonAlgRunner`] orchestrates clonal selection:
//! sort → affinity → clone & hypermutate → evaluate → random insertion →
//! replacement → repeat.

use super::config::{ClonAlgConfig, Replacement};
use crate::affinity::{clonal_mutation_rate, population_affinity};
use crate::driver::{sort_by_cost, Driver, ImmuneResult, StopReason};
use crate::error::ConfigError;
use crate::hypermutation::clone_and_hypermutate;
use crate::problem::ImmuneProblem;
use crate::random::rng_from_seed;
use crate::solution::{compare_costs, Gene, Solution};
use rand::Rng;
use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

/// Executes the ClonAlg loop.
///
/// # Usage
///
/// ```ignore
/// let problem = MyProblem::new();
/// let config = ClonAlgConfig::default().with_seed(42);
/// let result = ClonAlgRunner::run(&problem, &config)?;
/// println!("Best cost: {}", result.best_cost);
/// ```
pub struct ClonAlgRunner;

impl ClonAlgRunner {
    /// Runs ClonAlg.
    ///
    /// Fails before any evaluation if the configuration is invalid, and
    /// during initialization if the generator produces vectors of the wrong
    /// length.
    pub fn run<P: ImmuneProblem>(
        problem: &P,
        config: &ClonAlgConfig,
    ) -> Result<ImmuneResult<P::Gene>, ConfigError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs ClonAlg with an optional cancellation token.
    ///
    /// The token is checked at the top of every iteration; when it is set
    /// the run stops and returns the best solution found so far.
    pub fn run_with_cancel<P: ImmuneProblem>(
        problem: &P,
        config: &ClonAlgConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<ImmuneResult<P::Gene>, ConfigError> {
        config.validate()?;
        if problem.dimension() == 0 {
            return Err(ConfigError::invalid("dimension", "must be at least 1"));
        }

        let num_clones = config.clones_per_individual();
        info!(
            population_size = config.population_size,
            num_clones,
            dimension = problem.dimension(),
            replacement = ?config.replacement,
            "clonalg started"
        );

        let mut rng = rng_from_seed(config.seed);
        let (mut driver, mut population) = Driver::start(
            problem,
            config.limits(),
            config.parallel,
            cancel,
            config.population_size,
            &mut rng,
        )?;

        let stop_reason = loop {
            if let Some(reason) = driver.stop_reason() {
                break reason;
            }

            sort_by_cost(&mut population);
            let affinity = population_affinity(&population);

            let mut clones = hypermutate_population(&population, &affinity, num_clones, config, &mut rng);
            driver.evaluate(&mut clones);

            let randoms = driver.spawn(config.random_inserted, &mut rng)?;

            population = match config.replacement {
                Replacement::Truncation => {
                    truncate(population, clones, randoms, config.population_size)
                }
                Replacement::Compete => compete(population, clones.into_iter().chain(randoms)),
            };

            driver.record(&population);
        };

        info!(
            iterations = driver.iteration(),
            best_cost = driver.best_cost(),
            ?stop_reason,
            "clonalg finished"
        );

        sort_by_cost(&mut population);
        Ok(driver.finish(population, stop_reason))
    }
}

/// Clones every individual with an affinity-scaled mutation rate.
///
/// `population` and `affinity` are parallel slices; the population is
/// sorted ascending by cost.
fn hypermutate_population<G: Gene, R: Rng>(
    population: &[Solution<G>],
    affinity: &[f64],
    num_clones: usize,
    config: &ClonAlgConfig,
    rng: &mut R,
) -> Vec<Solution<G>> {
    let mut clones = Vec::new();
    for (parent, &score) in population.iter().zip(affinity) {
        let rate = clonal_mutation_rate(score, config.mutation_factor);
        clones.extend(clone_and_hypermutate(
            parent,
            num_clones,
            rate,
            config.mutation_std_dev,
            rng,
        ));
    }
    clones
}

/// Elitist truncation selection.
///
/// Pools clones, then the current population, then the random individuals,
/// stable-sorts ascending and keeps the first `size`. Ties therefore favour
/// clones over parents over random insertions.
fn truncate<G: Gene>(
    population: Vec<Solution<G>>,
    clones: Vec<Solution<G>>,
    randoms: Vec<Solution<G>>,
    size: usize,
) -> Vec<Solution<G>> {
    let mut pool = clones;
    pool.extend(population);
    pool.extend(randoms);
    sort_by_cost(&mut pool);
    pool.truncate(size);
    pool
}

/// Steady-state replacement: each challenger replaces the current worst
/// member iff it is strictly better. Costs are ranked by [`compare_costs`],
/// so a NaN member is the first to go and a NaN challenger never gets in.
/// Returns the population sorted.
fn compete<G: Gene>(
    mut population: Vec<Solution<G>>,
    challengers: impl IntoIterator<Item = Solution<G>>,
) -> Vec<Solution<G>> {
    for challenger in challengers {
        let worst = population
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| compare_costs(a.cost(), b.cost()))
            .map(|(i, s)| (i, s.cost()));
        if let Some((index, cost)) = worst {
            if compare_costs(challenger.cost(), cost) == CmpOrdering::Less {
                population[index] = challenger;
            }
        }
    }
    sort_by_cost(&mut population);
    population
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{BinaryProblem, Bounds, ContinuousProblem};
    use std::sync::atomic::Ordering;
    use std::sync::Mutex;

    // ---- Sum of squares over bits: minimum at the all-zero vector ----

    struct BitSquares {
        n: usize,
    }

    impl ImmuneProblem for BitSquares {
        type Gene = bool;

        fn dimension(&self) -> usize {
            self.n
        }

        fn generate<R: Rng>(&self, rng: &mut R) -> Vec<bool> {
            (0..self.n).map(|_| rng.random_bool(0.5)).collect()
        }

        fn evaluate(&self, bits: &[bool]) -> f64 {
            bits.iter().map(|&b| if b { 1.0 } else { 0.0 }).map(|x: f64| x * x).sum()
        }
    }

    fn config(pop: usize, iterations: usize) -> ClonAlgConfig {
        ClonAlgConfig::default()
            .with_population_size(pop)
            .with_max_iterations(iterations)
            .with_parallel(false)
            .with_seed(42)
    }

    #[test]
    fn test_binary_sum_of_squares_converges() {
        let problem = BitSquares { n: 8 };
        let result = ClonAlgRunner::run(&problem, &config(50, 200)).unwrap();

        assert_eq!(result.stop_reason, StopReason::MaxIterations);
        assert_eq!(result.iterations, 200);
        assert_eq!(result.best_cost, 0.0);
        assert_eq!(result.best.values(), &[false; 8]);
        // best after termination is no worse than after 10 iterations
        assert!(result.best_cost <= result.cost_history[10]);
    }

    #[test]
    fn test_converges_across_seeds() {
        let problem = BitSquares { n: 8 };
        for seed in 0..5 {
            let result = ClonAlgRunner::run(&problem, &config(50, 200).with_seed(seed)).unwrap();
            assert_eq!(result.best_cost, 0.0, "seed {seed} did not converge");
        }
    }

    #[test]
    fn test_cost_history_non_increasing() {
        let problem = BitSquares { n: 16 };
        let result = ClonAlgRunner::run(&problem, &config(20, 50)).unwrap();
        assert_eq!(result.cost_history.len(), 51);
        for window in result.cost_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best cost should never get worse: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_population_size_invariant() {
        let problem = BitSquares { n: 10 };
        let mut sizes = Vec::new();
        for iterations in [0, 1, 5, 17] {
            let result = ClonAlgRunner::run(&problem, &config(23, iterations)).unwrap();
            sizes.push(result.population.len());
        }
        for replacement in [Replacement::Truncation, Replacement::Compete] {
            let cfg = config(23, 9)
                .with_random_inserted(7)
                .with_replacement(replacement);
            let result = ClonAlgRunner::run(&problem, &cfg).unwrap();
            sizes.push(result.population.len());
        }
        assert!(sizes.iter().all(|&n| n == 23), "sizes = {sizes:?}");
    }

    #[test]
    fn test_final_population_sorted_and_evaluated() {
        let problem = BitSquares { n: 12 };
        let result = ClonAlgRunner::run(&problem, &config(30, 15)).unwrap();
        for window in result.population.windows(2) {
            assert!(window[0].cost() <= window[1].cost());
        }
        for s in &result.population {
            assert_eq!(s.cost(), problem.evaluate(s.values()));
        }
        assert_eq!(result.population[0].cost(), result.best_cost);
    }

    #[test]
    fn test_evaluation_count() {
        let problem = BitSquares { n: 6 };
        let cfg = config(20, 4).with_clone_factor(0.25).with_random_inserted(3);
        let result = ClonAlgRunner::run(&problem, &cfg).unwrap();
        // 20 initial + 4 * (20 * 5 clones + 3 randoms)
        assert_eq!(result.evaluations, 20 + 4 * (100 + 3));
    }

    #[test]
    fn test_deterministic_with_seed() {
        let problem = BitSquares { n: 20 };
        let a = ClonAlgRunner::run(&problem, &config(20, 10)).unwrap();
        let b = ClonAlgRunner::run(&problem, &config(20, 10)).unwrap();
        assert_eq!(a.cost_history, b.cost_history);
        assert_eq!(a.best, b.best);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let problem = BitSquares { n: 20 };
        let seq = ClonAlgRunner::run(&problem, &config(20, 10)).unwrap();
        let par = ClonAlgRunner::run(&problem, &config(20, 10).with_parallel(true)).unwrap();
        assert_eq!(seq.cost_history, par.cost_history);
        assert_eq!(seq.best, par.best);
    }

    #[test]
    fn test_degenerate_population_still_runs() {
        // every candidate costs the same: uniform affinity, no stall
        let problem = BinaryProblem::builder(6)
            .generator(|n, rng| (0..n).map(|_| rng.random_bool(0.5)).collect())
            .evaluator(|_| 1.0)
            .build()
            .unwrap();
        let result = ClonAlgRunner::run(&problem, &config(10, 5)).unwrap();
        assert_eq!(result.iterations, 5);
        assert_eq!(result.best_cost, 1.0);
    }

    #[test]
    fn test_external_predicate_and_notifications() {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let steps = Arc::new(Mutex::new(Vec::new()));
        let (u, s) = (updates.clone(), steps.clone());

        let problem = BinaryProblem::builder(12)
            .generator(|n, rng| (0..n).map(|_| rng.random_bool(0.5)).collect())
            .evaluator(|bits| bits.iter().filter(|&&b| b).count() as f64)
            .terminate_when(|_, iteration| iteration >= 6)
            .on_solution_updated(move |best, iteration| {
                u.lock().unwrap().push((iteration, best.cost()));
            })
            .on_stepped(move |_, iteration| s.lock().unwrap().push(iteration))
            .build()
            .unwrap();

        let result = ClonAlgRunner::run(&problem, &config(10, 0)).unwrap();
        assert_eq!(result.stop_reason, StopReason::Terminated);
        assert_eq!(result.iterations, 6);
        assert_eq!(*steps.lock().unwrap(), vec![0, 1, 2, 3, 4, 5]);

        let updates = updates.lock().unwrap();
        for pair in updates.windows(2) {
            assert!(pair[1].1 < pair[0].1, "updates must strictly improve");
        }
        if let Some(&(_, last)) = updates.last() {
            assert_eq!(last, result.best_cost);
        }
    }

    #[test]
    fn test_terminate_predicate_sees_improvement() {
        // stop at the first iteration that brings no improvement
        let problem = BinaryProblem::builder(4)
            .generator(|n, _| vec![true; n])
            .evaluator(|bits| bits.iter().filter(|&&b| b).count() as f64)
            .terminate_when(|last, iteration| iteration > 0 && last.is_none())
            .build()
            .unwrap();
        let result = ClonAlgRunner::run(&problem, &config(10, 1000)).unwrap();
        assert_eq!(result.stop_reason, StopReason::Terminated);
        assert!(result.iterations < 1000);
    }

    #[test]
    fn test_invalid_config_fails_before_evaluating() {
        let problem = BitSquares { n: 4 };
        let err = ClonAlgRunner::run(&problem, &config(0, 10)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "population_size",
                ..
            }
        ));
    }

    #[test]
    fn test_cancellation() {
        let problem = BitSquares { n: 8 };
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            ClonAlgRunner::run_with_cancel(&problem, &config(10, 1000), Some(cancel.clone()))
                .unwrap();
        assert_eq!(result.stop_reason, StopReason::Cancelled);
        assert_eq!(result.iterations, 0);
        assert!(cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stagnation_limit() {
        let problem = BinaryProblem::builder(4)
            .generator(|n, _| vec![false; n])
            .evaluator(|_| 0.0)
            .build()
            .unwrap();
        let result = ClonAlgRunner::run(&problem, &config(5, 1000).with_stagnation_limit(3)).unwrap();
        assert_eq!(result.stop_reason, StopReason::Stagnation);
        assert_eq!(result.iterations, 3);
    }

    // ---- Continuous: sphere ----

    #[test]
    fn test_continuous_sphere() {
        let bounds = Bounds::uniform(3, -5.0, 5.0).unwrap();
        let problem = ContinuousProblem::builder(bounds)
            .generator(|b, rng| b.sample_uniform(rng))
            .evaluator(|x, _| x.iter().map(|v| v * v).sum())
            .build()
            .unwrap();
        let cfg = config(40, 150).with_mutation_std_dev(0.3);
        let result = ClonAlgRunner::run(&problem, &cfg).unwrap();

        let initial = result.cost_history[0];
        assert!(
            result.best_cost < 0.5 && result.best_cost <= initial,
            "expected sphere cost < 0.5, got {} (initial {})",
            result.best_cost,
            initial
        );
    }

    #[test]
    fn test_infinite_sentinel_cost_is_tolerated() {
        let bounds = Bounds::uniform(2, -1.0, 1.0).unwrap();
        let problem = ContinuousProblem::builder(bounds)
            .generator(|b, rng| b.sample_uniform(rng))
            .evaluator(|x, b| {
                if b.contains(x) {
                    x.iter().map(|v| v.abs()).sum()
                } else {
                    f64::INFINITY
                }
            })
            .build()
            .unwrap();
        let result = ClonAlgRunner::run(&problem, &config(20, 30)).unwrap();
        assert!(result.best_cost.is_finite());
        assert!(result.best_cost <= result.cost_history[0]);
    }

    // ---- Replacement policies ----

    #[test]
    fn test_truncate_keeps_best_and_prefers_clones_on_ties() {
        let population = vec![
            Solution::with_cost(vec![true, true], 2.0),
            Solution::with_cost(vec![true, false], 1.0),
        ];
        let clones = vec![
            Solution::with_cost(vec![false, true], 1.0),
            Solution::with_cost(vec![false, false], 0.0),
        ];
        let randoms = vec![Solution::with_cost(vec![true, true], 5.0)];
        let next = truncate(population, clones, randoms, 2);
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].values(), &[false, false]);
        assert_eq!(next[1].values(), &[false, true]);
    }

    #[test]
    fn test_compete_replaces_worst_only_when_strictly_better() {
        let population = vec![
            Solution::with_cost(vec![0.0], 1.0),
            Solution::with_cost(vec![1.0], 4.0),
            Solution::with_cost(vec![2.0], 9.0),
        ];
        let challengers = vec![
            Solution::with_cost(vec![3.0], 9.0), // tie with worst: rejected
            Solution::with_cost(vec![4.0], 2.0), // replaces 9.0
            Solution::with_cost(vec![5.0], 3.0), // replaces 4.0
            Solution::with_cost(vec![6.0], 7.0), // worse than worst (3.0): rejected
        ];
        let next = compete(population, challengers);
        let costs: Vec<f64> = next.iter().map(Solution::cost).collect();
        assert_eq!(costs, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_compete_evicts_nan_and_rejects_nan() {
        let population = vec![
            Solution::with_cost(vec![0.0], f64::NAN),
            Solution::with_cost(vec![1.0], 4.0),
        ];
        let challengers = vec![
            Solution::with_cost(vec![2.0], 5.0),      // beats the NaN member
            Solution::with_cost(vec![3.0], f64::NAN), // never admitted
        ];
        let next = compete(population, challengers);
        let costs: Vec<f64> = next.iter().map(Solution::cost).collect();
        assert_eq!(costs, vec![4.0, 5.0]);
    }

    #[test]
    fn test_nan_costs_do_not_stall_the_run() {
        let problem = BinaryProblem::builder(2)
            .generator(|n, rng| (0..n).map(|_| rng.random_bool(0.5)).collect())
            .evaluator(|bits| match bits.iter().filter(|&&b| b).count() {
                1 => f64::NAN,
                ones => ones as f64,
            })
            .build()
            .unwrap();
        for replacement in [Replacement::Truncation, Replacement::Compete] {
            let cfg = config(4, 10).with_replacement(replacement);
            let result = ClonAlgRunner::run(&problem, &cfg).unwrap();
            assert_eq!(result.stop_reason, StopReason::MaxIterations);
            assert_eq!(result.iterations, 10);
            assert_eq!(result.population.len(), 4);
        }
    }

    #[test]
    fn test_oversized_clone_pool_is_rejected() {
        let problem = BitSquares { n: 4 };
        let cfg = config(4, 10).with_clone_factor(1e300);
        let err = ClonAlgRunner::run(&problem, &cfg).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "clone_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_compete_policy_runs() {
        let problem = BitSquares { n: 8 };
        let cfg = config(30, 150).with_replacement(Replacement::Compete);
        let result = ClonAlgRunner::run(&problem, &cfg).unwrap();
        assert_eq!(result.population.len(), 30);
        for window in result.cost_history.windows(2) {
            assert!(window[1] <= window[0]);
        }
        assert!(result.best_cost <= result.cost_history[0]);
    }
}
