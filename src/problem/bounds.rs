//! Box bounds for real-valued problems.

use crate::error::ConfigError;
use rand::Rng;

/// Per-coordinate lower and upper bounds.
///
/// Bounds are handed to the continuous generator and evaluator. The
/// runners do not clamp mutated coordinates; an evaluator that needs
/// feasibility should penalize out-of-box points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from per-coordinate limits.
    ///
    /// Fails if the vectors are empty, differ in length, hold non-finite
    /// values, or have `lower[i] > upper[i]`.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Result<Self, ConfigError> {
        if lower.is_empty() {
            return Err(ConfigError::InvalidBounds("bounds must not be empty".into()));
        }
        if lower.len() != upper.len() {
            return Err(ConfigError::InvalidBounds(format!(
                "lower has {} coordinates, upper has {}",
                lower.len(),
                upper.len()
            )));
        }
        for (i, (&lo, &hi)) in lower.iter().zip(upper.iter()).enumerate() {
            if !lo.is_finite() || !hi.is_finite() {
                return Err(ConfigError::InvalidBounds(format!(
                    "coordinate {i} has non-finite bounds [{lo}, {hi}]"
                )));
            }
            if lo > hi {
                return Err(ConfigError::InvalidBounds(format!(
                    "coordinate {i}: lower {lo} exceeds upper {hi}"
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Same `[lower, upper]` interval on every coordinate.
    pub fn uniform(dimension: usize, lower: f64, upper: f64) -> Result<Self, ConfigError> {
        Self::new(vec![lower; dimension], vec![upper; dimension])
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Whether `point` lies inside the box (inclusive).
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.dimension()
            && point
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(&x, (&lo, &hi))| x >= lo && x <= hi)
    }

    /// Draws a point uniformly from the box.
    ///
    /// Usable directly as a continuous generator:
    /// `.generator(|bounds, rng| bounds.sample_uniform(rng))`.
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| if lo == hi { lo } else { rng.random_range(lo..=hi) })
            .collect()
    }
}
