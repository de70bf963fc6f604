//! Abort conditions: predicates over an in-progress run's [`TuningData`] that the orchestrator
//! consults after each reported cost.

use std::time::{Duration, Instant};

use crate::cost::Cost;
use crate::tuning_data::TuningData;

/// A predicate that terminates the tuning loop. Consulted by the orchestrator after every
/// reported cost; a single `true` ends the run and marks it `terminated_early`.
pub trait AbortCondition {
    fn should_stop(&mut self, data: &TuningData) -> bool;

    /// A human-readable identifier, recorded on [`TuningData`] as the abort condition used for a
    /// run.
    fn name(&self) -> String;

    /// Combines `self` with `other`: stop once *either* condition holds.
    fn or<O: AbortCondition + 'static>(self, other: O) -> Or<Self, O>
    where
        Self: Sized,
    {
        Or(self, other)
    }

    /// Combines `self` with `other`: stop only once *both* conditions hold.
    fn and<O: AbortCondition + 'static>(self, other: O) -> And<Self, O>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

/// Stop once `n` distinct configurations have a recorded outcome.
#[derive(Debug, Clone, Copy)]
pub struct Evaluations(pub u64);

impl AbortCondition for Evaluations {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        data.num_evaluated() >= self.0
    }

    fn name(&self) -> String {
        format!("Evaluations({})", self.0)
    }
}

/// Stop once `⌈f · |SP|⌉` distinct configurations have a recorded outcome. `f` should be in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct Fraction(pub f64);

impl AbortCondition for Fraction {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        let target = (self.0 * data.search_space_size() as f64).ceil() as u64;
        data.num_evaluated() >= target
    }

    fn name(&self) -> String {
        format!("Fraction({})", self.0)
    }
}

/// Stop once `t` wall-clock time has elapsed since the run started.
#[derive(Debug, Clone, Copy)]
pub struct DurationElapsed(pub Duration);

impl AbortCondition for DurationElapsed {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        data.start_time().elapsed() >= self.0
    }

    fn name(&self) -> String {
        format!("Duration({:?})", self.0)
    }
}

/// Stop once the best recorded cost is `<= c`.
#[derive(Debug, Clone, Copy)]
pub struct CostAtMost(pub Cost);

impl AbortCondition for CostAtMost {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        data.best_cost().is_some_and(|best| best <= self.0)
    }

    fn name(&self) -> String {
        format!("Cost({})", self.0)
    }
}

/// The trailing window over which [`Speedup`] looks for an improvement.
#[derive(Debug, Clone, Copy)]
pub enum Window {
    Duration(Duration),
    Evaluations(u64),
}

/// Stop if, within the trailing window, the best cost hasn't improved by a factor of at least
/// `factor` (i.e. `old_best / new_best < factor`, for a minimising cost).
#[derive(Debug, Clone, Copy)]
pub struct Speedup {
    pub factor: f64,
    pub window: Window,
}

impl Speedup {
    pub fn new(factor: f64, window: Window) -> Self {
        Self { factor, window }
    }
}

impl AbortCondition for Speedup {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        let Some(current_best) = data.best_cost() else {
            return false;
        };
        let baseline = match self.window {
            Window::Duration(window) => {
                let cutoff = Instant::now() - window;
                data.best_cost_before(cutoff)
            }
            Window::Evaluations(window) => data.best_cost_evaluations_ago(window),
        };
        match baseline {
            // Not enough history yet to judge a stall.
            None => false,
            Some(baseline) => *baseline / *current_best < self.factor,
        }
    }

    fn name(&self) -> String {
        format!("Speedup({}, {:?})", self.factor, self.window)
    }
}

/// Stop once an externally-shared flag reads `true`. The orchestrator only ever reads this
/// between evaluations (§5), so no synchronisation beyond the atomic load is required.
#[derive(Clone)]
pub struct Cancelled(pub std::sync::Arc<std::sync::atomic::AtomicBool>);

impl AbortCondition for Cancelled {
    fn should_stop(&mut self, _data: &TuningData) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }

    fn name(&self) -> String {
        "Cancelled".to_owned()
    }
}

/// Stop once *either* `a` or `b` holds.
pub struct Or<A, B>(pub A, pub B);

impl<A: AbortCondition, B: AbortCondition> AbortCondition for Or<A, B> {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        // Both sides are evaluated (not short-circuited) so that a condition with its own
        // internal bookkeeping (were one ever added) stays in sync regardless of evaluation
        // order.
        let a = self.0.should_stop(data);
        let b = self.1.should_stop(data);
        a || b
    }

    fn name(&self) -> String {
        format!("Or({}, {})", self.0.name(), self.1.name())
    }
}

/// Stop once *both* `a` and `b` hold.
pub struct And<A, B>(pub A, pub B);

impl<A: AbortCondition, B: AbortCondition> AbortCondition for And<A, B> {
    fn should_stop(&mut self, data: &TuningData) -> bool {
        let a = self.0.should_stop(data);
        let b = self.1.should_stop(data);
        a && b
    }

    fn name(&self) -> String {
        format!("And({}, {})", self.0.name(), self.1.name())
    }
}
