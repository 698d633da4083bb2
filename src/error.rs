//! Configuration errors.
//!
//! The immune runners have a single failure mode: a misconfigured run.
//! Every variant is detected before the search loop does any real work
//! (or, for generator output, the first time the generator misbehaves).
//! Numeric degeneracies such as a zero cost range are not errors; they are
//! absorbed by the [`affinity`](crate::affinity) fallbacks.

use thiserror::Error;

/// A fatal configuration problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No solution generator was supplied to a problem builder.
    #[error("a solution generator is required")]
    MissingGenerator,

    /// No cost evaluator was supplied to a problem builder.
    #[error("a cost evaluator is required")]
    MissingEvaluator,

    /// A numeric parameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Human-readable description of the constraint that was violated.
        reason: String,
    },

    /// Lower/upper bounds are malformed.
    #[error("malformed bounds: {0}")]
    InvalidBounds(String),

    /// The generator produced a vector of the wrong length.
    #[error("generated solution has {actual} loci, expected {expected}")]
    DimensionMismatch {
        /// Dimension declared by the problem.
        expected: usize,
        /// Length actually produced by the generator.
        actual: usize,
    },

    /// The initial population produced no candidates.
    #[error("initial population is empty")]
    EmptyPopulation,
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
