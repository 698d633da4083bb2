//! Opt-aiNet configuration.

use crate::affinity::DEFAULT_BETA;
use crate::driver::{pool_size, Limits, MAX_BATCH};
use crate::error::ConfigError;

/// Fraction of the value range used by
/// [`OptAiNetConfig::with_threshold_from_bounds`].
const THRESHOLD_RANGE_FRACTION: f64 = 0.05;

/// Configuration for Opt-aiNet.
///
/// # Examples
///
/// ```
/// use u_immune::optainet::OptAiNetConfig;
///
/// let config = OptAiNetConfig::default()
///     .with_initial_population_size(30)
///     .with_num_clones(5)
///     .with_aff_threshold(2.0)
///     .with_max_progeny_attempts(50)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
///
/// // threshold derived from the value range: (10 - (-10)) * 0.05 = 1.0
/// let config = OptAiNetConfig::default()
///     .with_threshold_from_bounds(-10.0, 10.0)
///     .unwrap();
/// assert!((config.aff_threshold - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptAiNetConfig {
    /// Size of the initial population. Later populations vary in size.
    pub initial_population_size: usize,

    /// Clones generated per individual in every progeny attempt.
    pub num_clones: usize,

    /// Scale of the mutation rate `(1 / beta) * exp(-affinity)`.
    pub beta: f64,

    /// Suppression radius: two candidates are neighbours when their
    /// mismatch distance is strictly below this value.
    pub aff_threshold: f64,

    /// Freshly generated individuals added after suppression.
    pub random_inserted: usize,

    /// Upper bound on progeny regeneration attempts per iteration.
    ///
    /// A progeny pool is regenerated until its mean cost is strictly below
    /// the population mean. When this many attempts fail the last pool is
    /// used anyway. 0 = retry without limit (the cancellation token is
    /// still honoured between attempts).
    pub max_progeny_attempts: usize,

    /// Maximum number of iterations. 0 = no limit.
    pub max_iterations: usize,

    /// Iterations without improvement before stopping. 0 = disabled.
    pub stagnation_limit: usize,

    /// Optional wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,

    /// Whether to evaluate progeny batches in parallel (needs the
    /// `parallel` feature).
    pub parallel: bool,

    /// Random seed for reproducibility. `None` uses a random seed.
    pub seed: Option<u64>,
}

impl Default for OptAiNetConfig {
    fn default() -> Self {
        Self {
            initial_population_size: 20,
            num_clones: 10,
            beta: DEFAULT_BETA,
            aff_threshold: 1.0,
            random_inserted: 2,
            max_progeny_attempts: 100,
            max_iterations: 500,
            stagnation_limit: 0,
            time_limit_ms: None,
            parallel: true,
            seed: None,
        }
    }
}

impl OptAiNetConfig {
    pub fn with_initial_population_size(mut self, n: usize) -> Self {
        self.initial_population_size = n;
        self
    }

    pub fn with_num_clones(mut self, n: usize) -> Self {
        self.num_clones = n;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_aff_threshold(mut self, threshold: f64) -> Self {
        self.aff_threshold = threshold;
        self
    }

    /// Derives the suppression threshold from a scalar value range:
    /// `(upper - lower) * 0.05`.
    pub fn with_threshold_from_bounds(mut self, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(ConfigError::InvalidBounds(format!(
                "threshold bounds must be finite, got [{lower}, {upper}]"
            )));
        }
        if lower >= upper {
            return Err(ConfigError::InvalidBounds(format!(
                "threshold lower bound {lower} must be below upper bound {upper}"
            )));
        }
        self.aff_threshold = (upper - lower) * THRESHOLD_RANGE_FRACTION;
        Ok(self)
    }

    pub fn with_random_inserted(mut self, n: usize) -> Self {
        self.random_inserted = n;
        self
    }

    pub fn with_max_progeny_attempts(mut self, n: usize) -> Self {
        self.max_progeny_attempts = n;
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

    pub(crate) fn limits(&self) -> Limits {
        Limits {
            max_iterations: self.max_iterations,
            stagnation_limit: self.stagnation_limit,
            time_limit_ms: self.time_limit_ms,
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_population_size == 0 {
            return Err(ConfigError::invalid(
                "initial_population_size",
                "must be at least 1",
            ));
        }
        if self.num_clones == 0 {
            return Err(ConfigError::invalid("num_clones", "must be at least 1"));
        }
        if pool_size(self.initial_population_size, self.num_clones, 0).is_none() {
            return Err(ConfigError::invalid(
                "num_clones",
                format!(
                    "{} clones for {} individuals exceeds the candidate pool limit",
                    self.num_clones, self.initial_population_size
                ),
            ));
        }
        if self.random_inserted > MAX_BATCH {
            return Err(ConfigError::invalid(
                "random_inserted",
                format!("must be at most {MAX_BATCH}, got {}", self.random_inserted),
            ));
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(ConfigError::invalid(
                "beta",
                format!("must be finite and positive, got {}", self.beta),
            ));
        }
        if !self.aff_threshold.is_finite() || self.aff_threshold < 0.0 {
            return Err(ConfigError::invalid(
                "aff_threshold",
                format!("must be finite and non-negative, got {}", self.aff_threshold),
            ));
        }
        if self.time_limit_ms == Some(0) {
            return Err(ConfigError::invalid("time_limit_ms", "must be positive or None"));
        }
        Ok(())
    }
}
