//! The cost domain and the outcome of evaluating a single configuration.

use ordered_float::OrderedFloat;

/// A strictly-orderable cost, as returned by a cost function.
///
/// `OrderedFloat` is used (rather than a raw `f64`) so the total ordering required by
/// [`Cost`]'s consumers — picking a best-so-far, sorting a frontier, comparing against
/// `Cost(c)` abort conditions — is enforced by the type instead of by convention, and so that
/// `OrderedFloat(f64::INFINITY)` can serve as the penalty sentinel described in [`crate::tuner`].
pub type Cost = OrderedFloat<f64>;

/// What a cost function can signal instead of returning a [`Cost`].
#[derive(Debug)]
pub enum CostError {
    /// The configuration is infeasible (e.g. violates a runtime precondition the static
    /// constraints in [`crate::parameter`] couldn't express). Recorded as invalid; the run
    /// continues with a penalty cost reported to the search technique.
    InvalidConfiguration,
    /// Any other failure. Surfaced to the caller of [`Tuner::tune`](crate::Tuner::tune) /
    /// [`Tuner::make_step`](crate::Tuner::make_step), terminating the run.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CostError {
    /// Wraps an arbitrary error as an [`CostError::Other`].
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        CostError::Other(Box::new(err))
    }
}

/// The recorded result of evaluating one [`Configuration`](crate::configuration::Configuration).
#[derive(Debug, Clone)]
pub enum Outcome {
    Valid(Cost),
    Invalid,
}

impl Outcome {
    pub fn cost(&self) -> Option<Cost> {
        match self {
            Outcome::Valid(c) => Some(*c),
            Outcome::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid(_))
    }
}
