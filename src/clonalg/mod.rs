//! Clonal Selection Algorithm (ClonAlg).
//!
//! A fixed-size population evolves by cloning every individual and
//! hypermutating the clones with a rate that shrinks as the individual's
//! affinity grows. Clones, parents and a few random newcomers are pooled
//! and the best `population_size` survive.
//!
//! The same runner serves binary and real-valued problems; the gene type
//! of the [`ImmuneProblem`](crate::problem::ImmuneProblem) decides what a
//! mutation does.
//!
//! # References
//!
//! - de Castro & Von Zuben (2002), "Learning and Optimization Using the
//!   Clonal Selection Principle", *IEEE Trans. Evol. Comput.* 6(3), 239–251
//! - Brownlee (2011), *Clever Algorithms*, "Clonal Selection Algorithm"

mod config;
mod runner;

pub use config::{ClonAlgConfig, Replacement};
pub use runner::ClonAlgRunner;
