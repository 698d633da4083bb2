//! Immune-inspired population-based optimization.
//!
//! Minimizes a black-box cost function over binary (`bool`) or real
//! (`f64`) vectors with two artificial-immune-system heuristics:
//!
//! - **ClonAlg**: Clonal selection. Every individual is cloned and the
//!   clones are hypermutated at a rate that falls as affinity rises; an
//!   elitist replacement keeps the population size fixed.
//! - **Opt-aiNet**: An immune network. Clonal expansion is repeated until
//!   the progeny improve on the population mean, then neighbouring
//!   antibodies suppress each other so that one representative per local
//!   optimum survives. The population size varies.
//!
//! Both engines share one problem abstraction ([`problem::ImmuneProblem`]),
//! one affinity model ([`affinity`]) and one run driver with the same
//! termination contract and [`driver::ImmuneResult`].
//!
//! # Quick start
//!
//! ```
//! use u_immune::clonalg::{ClonAlgConfig, ClonAlgRunner};
//! use u_immune::problem::BinaryProblem;
//! use rand::Rng;
//!
//! let problem = BinaryProblem::builder(8)
//!     .generator(|n, rng| (0..n).map(|_| rng.random_bool(0.5)).collect())
//!     .evaluator(|bits| bits.iter().filter(|&&b| b).count() as f64)
//!     .build()
//!     .unwrap();
//!
//! let config = ClonAlgConfig::default()
//!     .with_population_size(50)
//!     .with_max_iterations(200)
//!     .with_seed(42);
//! let result = ClonAlgRunner::run(&problem, &config).unwrap();
//! assert_eq!(result.best_cost, 0.0);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): evaluate candidate batches with rayon.
//! - `serde`: `Serialize`/`Deserialize` for configs, solutions and bounds.
//!
//! Progress is reported through `tracing`; the crate never installs a
//! subscriber.

pub mod affinity;
pub mod clonalg;
pub mod driver;
pub mod error;
pub mod hypermutation;
pub mod optainet;
pub mod problem;
pub mod random;
pub mod solution;
