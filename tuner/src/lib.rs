//! A generic auto-tuner over interdependent, constrained tuning parameters.
//!
//! An embedder declares a list of [`Parameter`]s (names, ranges, and constraints on earlier
//! parameters' values), builds a [`SearchSpace`] from them, and drives a [`Tuner`] with a search
//! [`Technique`] and an [`AbortCondition`]. The tuner proposes candidate [`Configuration`]s,
//! evaluates them against a supplied cost function, and records the run in a [`TuningData`].
//!
//! ```
//! use tuner::{Config, Parameter, Range, Technique};
//! use tuner::technique::Exhaustive;
//!
//! let parameters = vec![
//!     Parameter::new("threads", Range::interval(1, 8, 1)),
//!     Parameter::new("batch_size", Range::set([16, 32, 64])),
//! ];
//! let mut tuner = tuner::Tuner::new(parameters, Technique::from(Exhaustive::new()), "exhaustive", Config::default())
//!     .expect("parameters are well-formed");
//! let data = tuner
//!     .tune(
//!         &mut |config| {
//!             let threads = config.get("threads").unwrap().as_int().unwrap();
//!             Ok(tuner::Cost::from(1.0 / threads as f64))
//!         },
//!         None,
//!     )
//!     .unwrap();
//! assert!(data.best_cost().is_some());
//! ```

pub mod abort;
pub mod configuration;
pub mod cost;
pub mod error;
mod log_sink;
pub mod parameter;
pub mod space;
pub mod technique;
pub mod tuner;
pub mod tuning_data;
pub mod value;

pub use abort::{AbortCondition, And, CostAtMost, Cancelled, DurationElapsed, Evaluations, Fraction, Or, Speedup, Window};
pub use configuration::Configuration;
pub use cost::{Cost, CostError, Outcome};
pub use error::{ConfigurationError, Error, Result};
pub use parameter::{Bindings, Constraint, Parameter, Range};
pub use space::SearchSpace;
pub use technique::{CoordinateTechnique, Exhaustive, IndexTechnique, Technique};
pub use tuner::{Config, Step, Tuner};
pub use tuning_data::{HistoryEntry, TuningData};
pub use value::Value;
