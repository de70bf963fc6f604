//! The search-technique abstraction: the pluggable strategy that proposes candidate points for
//! the orchestrator to evaluate.
//!
//! Concrete search algorithms (simulated annealing, differential evolution, pattern search,
//! Torczon, AUC-bandit, round-robin, ...) are out of scope for this crate; they're expected to
//! implement [`CoordinateTechnique`] or [`IndexTechnique`] and be handed to [`Tuner`](crate::Tuner)
//! by the embedder. [`Exhaustive`] is the one concrete technique shipped here, both as a sane
//! default and so the crate is usable standalone.

use std::collections::HashMap;

use crate::cost::Cost;

/// A search technique that proposes points in the continuous coordinate cube `(0, 1]^D`.
pub trait CoordinateTechnique {
    /// Called once, before the first [`Self::get_next_coordinates`], with the number of
    /// parameters `d`.
    fn initialize(&mut self, d: usize);

    /// Called once, after the tuning run has finished (successfully or not).
    fn finalize(&mut self) {}

    /// Proposes the next batch of coordinates to evaluate. Each tuple has exactly `d` entries,
    /// each in `(0, 1]`. May return more than one coordinate per call; the set size is
    /// technique-defined.
    fn get_next_coordinates(&mut self) -> Vec<Vec<f64>>;

    /// Reports the cost (or penalty) of exactly the coordinates returned by the most recent
    /// [`Self::get_next_coordinates`], paired up in the same order. A raw `f64` tuple can't be a
    /// `HashMap` key (no total `Eq`/`Hash`), so unlike [`IndexTechnique::report_costs`] this is a
    /// list of pairs rather than a map.
    fn report_costs(&mut self, costs: Vec<(Vec<f64>, Cost)>);
}

/// A search technique that proposes points as indices in the flat range `[0, |SP|)`.
pub trait IndexTechnique {
    /// Called once, before the first [`Self::get_next_indices`], with the search space size
    /// `size`.
    fn initialize(&mut self, size: u64);

    /// Called once, after the tuning run has finished (successfully or not).
    fn finalize(&mut self) {}

    /// Proposes the next batch of indices to evaluate. May return more than one index per call;
    /// the set size is technique-defined.
    fn get_next_indices(&mut self) -> Vec<u64>;

    /// Reports the cost (or penalty) of exactly the indices (or a subset, if some came back
    /// invalid) returned by the most recent [`Self::get_next_indices`].
    fn report_costs(&mut self, costs: HashMap<u64, Cost>);
}

/// Either shape of search technique a [`Tuner`](crate::Tuner) can be configured with. Concrete
/// techniques aren't required to be `Debug`/named, so the human-readable identifier recorded on
/// [`TuningData`](crate::tuning_data::TuningData) is supplied alongside this, not derived from it
/// (see [`Tuner::new`](crate::Tuner::new)).
pub enum Technique {
    Coordinate(Box<dyn CoordinateTechnique>),
    Index(Box<dyn IndexTechnique>),
}

/// An index-space technique that proposes one never-before-proposed index per step, in ascending
/// order. Requires no configuration and consumes no state beyond a cursor, so it's a reasonable
/// default when the embedder doesn't have an opinion about exploration order.
#[derive(Debug, Default)]
pub struct Exhaustive {
    size: u64,
    next: u64,
}

impl Exhaustive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexTechnique for Exhaustive {
    fn initialize(&mut self, size: u64) {
        self.size = size;
        self.next = 0;
    }

    fn get_next_indices(&mut self) -> Vec<u64> {
        if self.next >= self.size {
            return Vec::new();
        }
        let idx = self.next;
        self.next += 1;
        vec![idx]
    }

    fn report_costs(&mut self, _costs: HashMap<u64, Cost>) {
        // Exhaustive search ignores feedback: every index is visited exactly once regardless of
        // cost.
    }
}

impl From<Exhaustive> for Technique {
    fn from(technique: Exhaustive) -> Self {
        Technique::Index(Box::new(technique))
    }
}
