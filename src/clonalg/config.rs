//! ClonAlg configuration.
//!
//! [`ClonAlgConfig`] holds all parameters that control the clonal
//! selection loop.

use crate::affinity::DEFAULT_MUTATION_FACTOR;
use crate::driver::{pool_size, Limits, MAX_BATCH};
use crate::error::ConfigError;

/// How the next population is formed from the current one, the clones and
/// the random insertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Replacement {
    /// Elitist truncation: pool everything, sort ascending by cost, keep
    /// the first `population_size`.
    #[default]
    Truncation,

    /// Steady-state competition: each challenger, in order, replaces the
    /// current worst member iff it is strictly better.
    Compete,
}

/// Configuration for ClonAlg.
///
/// # Defaults
///
/// ```
/// use u_immune::clonalg::ClonAlgConfig;
///
/// let config = ClonAlgConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.clones_per_individual(), 10);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_immune::clonalg::ClonAlgConfig;
///
/// let config = ClonAlgConfig::default()
///     .with_population_size(50)
///     .with_clone_factor(0.2)
///     .with_mutation_std_dev(0.5)
///     .with_max_iterations(200)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClonAlgConfig {
    /// Number of individuals kept after every iteration.
    pub population_size: usize,

    /// Clones per individual are `floor(population_size * clone_factor)`.
    pub clone_factor: f64,

    /// Exponent scale of the mutation rate `exp(mutation_factor * affinity)`.
    ///
    /// Must be negative so that better individuals mutate less.
    pub mutation_factor: f64,

    /// Standard deviation of the normal perturbation for real-valued genes.
    ///
    /// Ignored for binary genes.
    pub mutation_std_dev: f64,

    /// Freshly generated individuals added to the pool every iteration.
    pub random_inserted: usize,

    /// Population replacement policy.
    pub replacement: Replacement,

    /// Maximum number of iterations. 0 = no limit (rely on the problem's
    /// termination predicate, the time limit or cancellation).
    pub max_iterations: usize,

    /// Iterations without improvement before stopping. 0 = disabled.
    pub stagnation_limit: usize,

    /// Optional wall-clock limit in milliseconds, checked once per
    /// iteration.
    pub time_limit_ms: Option<u64>,

    /// Whether to evaluate clone batches in parallel (needs the `parallel`
    /// feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for ClonAlgConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            clone_factor: 0.1,
            mutation_factor: DEFAULT_MUTATION_FACTOR,
            mutation_std_dev: 3.0,
            random_inserted: 2,
            replacement: Replacement::default(),
            max_iterations: 500,
            stagnation_limit: 0,
            time_limit_ms: None,
            parallel: true,
            seed: None,
        }
    }
}

impl ClonAlgConfig {
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    pub fn with_clone_factor(mut self, factor: f64) -> Self {
        self.clone_factor = factor;
        self
    }

    pub fn with_mutation_factor(mut self, factor: f64) -> Self {
        self.mutation_factor = factor;
        self
    }

    pub fn with_mutation_std_dev(mut self, std_dev: f64) -> Self {
        self.mutation_std_dev = std_dev;
        self
    }

    pub fn with_random_inserted(mut self, n: usize) -> Self {
        self.random_inserted = n;
        self
    }

    pub fn with_replacement(mut self, replacement: Replacement) -> Self {
        self.replacement = replacement;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of clones produced per individual each iteration.
    pub fn clones_per_individual(&self) -> usize {
        (self.population_size as f64 * self.clone_factor).floor() as usize
    }

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_iterations: self.max_iterations,
            stagnation_limit: self.stagnation_limit,
            time_limit_ms: self.time_limit_ms,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::invalid("population_size", "must be at least 1"));
        }
        if !self.clone_factor.is_finite() || self.clone_factor < 0.0 {
            return Err(ConfigError::invalid(
                "clone_factor",
                format!("must be finite and non-negative, got {}", self.clone_factor),
            ));
        }
        if !self.mutation_factor.is_finite() || self.mutation_factor >= 0.0 {
            return Err(ConfigError::invalid(
                "mutation_factor",
                format!("must be finite and negative, got {}", self.mutation_factor),
            ));
        }
        if !self.mutation_std_dev.is_finite() || self.mutation_std_dev < 0.0 {
            return Err(ConfigError::invalid(
                "mutation_std_dev",
                format!("must be finite and non-negative, got {}", self.mutation_std_dev),
            ));
        }
        if self.random_inserted > MAX_BATCH {
            return Err(ConfigError::invalid(
                "random_inserted",
                format!("must be at most {MAX_BATCH}, got {}", self.random_inserted),
            ));
        }
        // truncation pools the clones with the parents and the random insertions
        let extra = self.population_size.saturating_add(self.random_inserted);
        if pool_size(self.population_size, self.clones_per_individual(), extra).is_none() {
            return Err(ConfigError::invalid(
                "clone_factor",
                format!(
                    "{} clones per individual for {} individuals exceeds the candidate pool limit",
                    self.clones_per_individual(),
                    self.population_size
                ),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::invalid("time_limit_ms", "must be positive or None"));
        }
        Ok(())
    }
}
