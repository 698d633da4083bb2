//! Opt-aiNet execution loop.
//!
//! [`OptAiNetRunner`] orchestrates the immune network:
//! affinity → progeny (regenerated until it beats the population mean) →
//! suppression → random insertion → sort → repeat.

use super::config::OptAiNetConfig;
use super::suppression::suppress;
use crate::affinity::{network_mutation_rate, population_affinity};
use crate::driver::{mean_cost, sort_by_cost, Driver, ImmuneResult, StopReason};
use crate::error::ConfigError;
use crate::hypermutation::clone_and_hypermutate;
use crate::problem::ImmuneProblem;
use crate::random::rng_from_seed;
use crate::solution::Solution;
use rand::Rng;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Executes the Opt-aiNet loop.
///
/// Unlike ClonAlg the population size is not fixed: it grows with every
/// distinct local optimum the network discovers and shrinks when
/// suppression merges neighbours.
///
/// # Usage
///
/// ```ignore
/// let config = OptAiNetConfig::default()
///     .with_threshold_from_bounds(-5.0, 5.0)?
///     .with_seed(42);
/// let result = OptAiNetRunner::run(&problem, &config)?;
/// for optimum in &result.population {
///     println!("{:?} -> {}", optimum.values(), optimum.cost());
/// }
/// ```
pub struct OptAiNetRunner;

impl OptAiNetRunner {
    /// Runs Opt-aiNet.
    pub fn run<P: ImmuneProblem>(
        problem: &P,
        config: &OptAiNetConfig,
    ) -> Result<ImmuneResult<P::Gene>, ConfigError> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs Opt-aiNet with an optional cancellation token.
    ///
    /// The token is checked at the top of every iteration and before every
    /// progeny attempt, so a run with unbounded attempts still stops.
    pub fn run_with_cancel<P: ImmuneProblem>(
        problem: &P,
        config: &OptAiNetConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<ImmuneResult<P::Gene>, ConfigError> {
        config.validate()?;
        if problem.dimension() == 0 {
            return Err(ConfigError::invalid("dimension", "must be at least 1"));
        }

        info!(
            initial_population_size = config.initial_population_size,
            num_clones = config.num_clones,
            aff_threshold = config.aff_threshold,
            dimension = problem.dimension(),
            "opt-ainet started"
        );

        let mut rng = rng_from_seed(config.seed);
        let (mut driver, mut population) = Driver::start(
            problem,
            config.limits(),
            config.parallel,
            cancel,
            config.initial_population_size,
            &mut rng,
        )?;
        sort_by_cost(&mut population);

        let stop_reason = loop {
            if let Some(reason) = driver.stop_reason() {
                break reason;
            }

            let avg_cost = mean_cost(&population);
            let affinity = population_affinity(&population);

            let Some(progeny) =
                breed_progeny(&mut driver, &population, &affinity, avg_cost, config, &mut rng)
            else {
                break StopReason::Cancelled;
            };

            let mut next = suppress(progeny, config.aff_threshold);
            next.extend(driver.spawn(config.random_inserted, &mut rng)?);
            sort_by_cost(&mut next);
            population = next;

            driver.record(&population);
        };

        info!(
            iterations = driver.iteration(),
            best_cost = driver.best_cost(),
            network_size = population.len(),
            ?stop_reason,
            "opt-ainet finished"
        );

        Ok(driver.finish(population, stop_reason))
    }
}

/// Builds and evaluates a progeny pool, retrying from scratch until its mean
/// cost is strictly below `avg_cost`.
///
/// Every parent contributes `num_clones` clones mutated with rate and
/// strength `(1 / beta) * exp(-affinity)`. Returns `None` when the run is
/// cancelled between attempts. After `max_progeny_attempts` failures the
/// last pool is returned.
fn breed_progeny<P: ImmuneProblem, R: Rng>(
    driver: &mut Driver<'_, P>,
    population: &[Solution<P::Gene>],
    affinity: &[f64],
    avg_cost: f64,
    config: &OptAiNetConfig,
    rng: &mut R,
) -> Option<Vec<Solution<P::Gene>>> {
    let mut attempt = 0;
    loop {
        if driver.is_cancelled() {
            return None;
        }
        attempt += 1;

        let mut progeny = Vec::new();
        for (parent, &score) in population.iter().zip(affinity) {
            let rate = network_mutation_rate(score, config.beta);
            progeny.extend(clone_and_hypermutate(parent, config.num_clones, rate, rate, rng));
        }
        driver.evaluate(&mut progeny);

        let progeny_mean = mean_cost(&progeny);
        if progeny_mean < avg_cost {
            trace!(attempt, avg_cost, progeny_mean, "progeny accepted");
            return Some(progeny);
        }
        if config.max_progeny_attempts > 0 && attempt >= config.max_progeny_attempts {
            warn!(
                attempts = attempt,
                avg_cost,
                progeny_mean,
                "progeny never beat the population mean, keeping the last pool"
            );
            return Some(progeny);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
