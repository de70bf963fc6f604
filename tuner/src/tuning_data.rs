//! The read-only summary of a tuning run: what was tried, in what order, and how it went.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use ordered_float::OrderedFloat;

use crate::configuration::Configuration;
use crate::cost::{Cost, Outcome};
use crate::parameter::Parameter;

/// A single evaluated configuration, in the order it was evaluated.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub timestamp: Instant,
    pub index: u64,
    pub configuration: Configuration,
    pub outcome: Outcome,
}

/// Accumulated bookkeeping for one tuning run, mutated exclusively by the orchestrator and
/// otherwise read-only.
#[derive(Debug, Clone)]
pub struct TuningData {
    parameters: Vec<Parameter>,
    search_space_size: u64,
    unconstrained_size: u64,
    generation_time: Duration,
    technique_name: String,
    abort_condition_name: String,
    start_time: Instant,
    terminated_early: bool,

    history: Vec<HistoryEntry>,
    improvement_history: Vec<HistoryEntry>,
    num_valid: u64,
    num_invalid: u64,

    best_cost: Option<Cost>,
    best_entry_idx: Option<usize>,
    max_valid_cost: Option<Cost>,

    /// Costs of indices with a recorded *valid* outcome, so the orchestrator can skip
    /// re-evaluating them while still retrying previously-`Invalid` ones.
    valid_costs: HashMap<u64, Cost>,
    seen: HashSet<u64>,
}

impl TuningData {
    pub(crate) fn new(
        parameters: Vec<Parameter>,
        search_space_size: u64,
        unconstrained_size: u64,
        generation_time: Duration,
        technique_name: String,
        abort_condition_name: String,
    ) -> Self {
        Self {
            parameters,
            search_space_size,
            unconstrained_size,
            generation_time,
            technique_name,
            abort_condition_name,
            start_time: Instant::now(),
            terminated_early: false,

            history: Vec::new(),
            improvement_history: Vec::new(),
            num_valid: 0,
            num_invalid: 0,

            best_cost: None,
            best_entry_idx: None,
            max_valid_cost: None,

            valid_costs: HashMap::new(),
            seen: HashSet::new(),
        }
    }

    /// Appends an evaluation outcome and updates best-so-far / improvement-history bookkeeping.
    pub(crate) fn record(&mut self, index: u64, configuration: Configuration, outcome: Outcome) {
        self.seen.insert(index);
        match &outcome {
            Outcome::Valid(cost) => {
                self.num_valid += 1;
                self.valid_costs.insert(index, *cost);
                if self.max_valid_cost.map_or(true, |worst| *cost > worst) {
                    self.max_valid_cost = Some(*cost);
                }
                if self.best_cost.map_or(true, |best| *cost < best) {
                    self.best_cost = Some(*cost);
                    self.best_entry_idx = Some(self.history.len());
                    self.improvement_history.push(HistoryEntry {
                        timestamp: Instant::now(),
                        index,
                        configuration: configuration.clone(),
                        outcome: outcome.clone(),
                    });
                }
            }
            Outcome::Invalid => self.num_invalid += 1,
        }
        self.history.push(HistoryEntry {
            timestamp: Instant::now(),
            index,
            configuration,
            outcome,
        });
    }

    pub(crate) fn mark_terminated_early(&mut self) {
        self.terminated_early = true;
    }

    pub(crate) fn set_abort_condition_name(&mut self, name: String) {
        self.abort_condition_name = name;
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// `|SP|`.
    pub fn search_space_size(&self) -> u64 {
        self.search_space_size
    }

    /// `∏|range_i|`.
    pub fn unconstrained_size(&self) -> u64 {
        self.unconstrained_size
    }

    pub fn generation_time(&self) -> Duration {
        self.generation_time
    }

    pub fn technique_name(&self) -> &str {
        &self.technique_name
    }

    pub fn abort_condition_name(&self) -> &str {
        &self.abort_condition_name
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    pub fn terminated_early(&self) -> bool {
        self.terminated_early
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The subsequence of [`Self::history`] where the best-so-far cost strictly decreased.
    pub fn improvement_history(&self) -> &[HistoryEntry] {
        &self.improvement_history
    }

    /// Total number of evaluations recorded (valid or invalid); a retried `Invalid` index is
    /// counted once per retry.
    pub fn num_evaluated(&self) -> u64 {
        self.history.len() as u64
    }

    pub fn num_valid(&self) -> u64 {
        self.num_valid
    }

    pub fn num_invalid(&self) -> u64 {
        self.num_invalid
    }

    /// Whether `index` has any recorded outcome (valid or invalid).
    pub fn has_outcome(&self, index: u64) -> bool {
        self.seen.contains(&index)
    }

    /// Number of distinct indices with a recorded outcome (valid or invalid). Unlike
    /// [`Self::num_evaluated`], a retried `Invalid` index is only counted once here; this is what
    /// the orchestrator compares against `|SP|` to detect that the whole space has been covered.
    pub fn seen_count(&self) -> u64 {
        self.seen.len() as u64
    }

    /// The cached cost of `index`, if it was previously evaluated and found valid. Invalid
    /// configurations deliberately aren't cached here, so they're retried on the next proposal
    /// rather than silently re-reported with a stale penalty.
    pub fn valid_cost(&self, index: u64) -> Option<Cost> {
        self.valid_costs.get(&index).copied()
    }

    /// The cost reported in place of evaluating an `Invalid` configuration: the largest valid
    /// cost observed so far, or `+inf` if no valid configuration has been seen yet.
    pub fn penalty_cost(&self) -> Cost {
        self.max_valid_cost.unwrap_or(OrderedFloat(f64::INFINITY))
    }

    pub fn best_cost(&self) -> Option<Cost> {
        self.best_cost
    }

    pub fn best_configuration(&self) -> Option<&Configuration> {
        self.best_entry_idx.map(|i| &self.history[i].configuration)
    }

    pub fn best_index(&self) -> Option<u64> {
        self.best_entry_idx.map(|i| self.history[i].index)
    }

    pub fn best_timestamp(&self) -> Option<Instant> {
        self.best_entry_idx.map(|i| self.history[i].timestamp)
    }

    /// Wall-clock time between the run starting and the best configuration first being found.
    pub fn time_to_best(&self) -> Option<Duration> {
        self.best_timestamp().map(|t| t.duration_since(self.start_time))
    }

    /// Number of evaluations performed (inclusive) until the best configuration was first found.
    pub fn evaluations_to_best(&self) -> Option<u64> {
        self.best_entry_idx.map(|i| i as u64 + 1)
    }

    /// The best valid cost recorded among entries timestamped at or before `cutoff`. Used by
    /// [`Speedup`](crate::abort::Speedup)'s `Duration` window.
    pub fn best_cost_before(&self, cutoff: Instant) -> Option<Cost> {
        self.history
            .iter()
            .filter(|e| e.timestamp <= cutoff)
            .filter_map(|e| e.outcome.cost())
            .min()
    }

    /// The best valid cost recorded among all but the trailing `n` evaluations. Used by
    /// [`Speedup`](crate::abort::Speedup)'s `Evaluations` window.
    pub fn best_cost_evaluations_ago(&self, n: u64) -> Option<Cost> {
        let n = n as usize;
        if self.history.len() <= n {
            return None;
        }
        let cutoff = self.history.len() - n;
        self.history[..cutoff].iter().filter_map(|e| e.outcome.cost()).min()
    }
}
