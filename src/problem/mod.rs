//! Problem definitions.
//!
//! Implement [`ImmuneProblem`] directly, or assemble one from closures with
//! [`BinaryProblem`] / [`ContinuousProblem`].

mod adapters;
mod bounds;
mod types;

pub use adapters::{
    BinaryProblem, BinaryProblemBuilder, ContinuousProblem, ContinuousProblemBuilder,
};
pub use bounds::Bounds;
pub use types::ImmuneProblem;
