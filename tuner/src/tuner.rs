//! The orchestrator: drives the request/report loop between a [`Technique`] and a cost function,
//! enforces the abort condition, and maintains [`TuningData`].

use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info, warn};

use crate::abort::{AbortCondition, Evaluations};
use crate::configuration::Configuration;
use crate::cost::{Cost, CostError, Outcome};
use crate::error::{Error, Result};
use crate::log_sink::LogSink;
use crate::parameter::Parameter;
use crate::space::SearchSpace;
use crate::technique::Technique;
use crate::tuning_data::TuningData;

/// Settings which affect *how* a [`Tuner`] runs, but never *which* configurations it visits.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Suppress the orchestrator's own progress logging (`log::info!` calls). Warnings and the
    /// run log file are unaffected.
    pub silent: bool,
    /// If set, append one line per evaluation to this file (§6).
    pub log_file: Option<PathBuf>,
}

/// A cost function's verdict on one [`Configuration`].
pub type CostResult = std::result::Result<Cost, CostError>;

/// Whether a [`Tuner::make_step`] call found the technique still had proposals left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The technique proposed at least one index/coordinate.
    Continued,
    /// The technique proposed nothing; the search space has been exhausted from its point of
    /// view.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Configured,
    Running,
    Terminated,
}

/// Drives a tuning run: proposes points via a [`Technique`], maps them to configurations,
/// invokes the embedder's cost function, and reports outcomes back, subject to an abort
/// condition. See the crate-level docs for the overall data flow.
pub struct Tuner {
    search_space: SearchSpace,
    technique: Technique,
    silent: bool,
    log_sink: Option<LogSink>,
    data: TuningData,
    state: State,
    technique_initialized: bool,
}

impl Tuner {
    /// Builds the search space from `parameters` and configures a tuning run.
    ///
    /// Fails if the parameters are ill-formed or the search space is empty (see
    /// [`SearchSpace::generate`]), or if `config.log_file` couldn't be opened.
    pub fn new(
        parameters: Vec<Parameter>,
        technique: Technique,
        technique_name: impl Into<String>,
        config: Config,
    ) -> Result<Self> {
        let technique_name = technique_name.into();
        let gen_start = Instant::now();
        let search_space = SearchSpace::generate(parameters)?;
        let generation_time = gen_start.elapsed();

        if !config.silent {
            info!(
                "generated search space: {} valid configuration(s) out of {} unconstrained, in {:?}",
                search_space.size(),
                search_space.unconstrained_size(),
                generation_time
            );
        }

        let log_sink = config
            .log_file
            .as_ref()
            .map(LogSink::open)
            .transpose()
            .map_err(Error::LogFile)?;

        let data = TuningData::new(
            search_space.parameters().to_vec(),
            search_space.size(),
            search_space.unconstrained_size(),
            generation_time,
            technique_name.clone(),
            "none (program-guided)".to_owned(),
        );

        Ok(Self {
            search_space,
            technique,
            silent: config.silent,
            log_sink,
            data,
            state: State::Configured,
            technique_initialized: false,
        })
    }

    pub fn search_space(&self) -> &SearchSpace {
        &self.search_space
    }

    /// Read-only summary of the run so far. Queryable even mid-run, and even after a run
    /// terminated early due to an error.
    pub fn tuning_data(&self) -> &TuningData {
        &self.data
    }

    /// Runs the tuning loop until `abort_condition` fires or the search space is exhausted.
    ///
    /// If `abort_condition` is `None`, defaults to `Evaluations(|SP|)`, i.e. exhaustive search
    /// (§6).
    pub fn tune(
        &mut self,
        cost_fn: &mut dyn FnMut(&Configuration) -> CostResult,
        abort_condition: Option<&mut dyn AbortCondition>,
    ) -> Result<&TuningData> {
        let mut default_abort = Evaluations(self.search_space.size());
        let abort: &mut dyn AbortCondition = match abort_condition {
            Some(a) => a,
            None => &mut default_abort,
        };
        self.data.set_abort_condition_name(abort.name());

        self.enter_running()?;
        if !self.technique_initialized {
            self.initialize_technique();
        }

        loop {
            match self.step(cost_fn) {
                Ok(Step::Exhausted) => {
                    self.terminate();
                    break;
                }
                Ok(Step::Continued) => {}
                Err(e) => {
                    self.terminate();
                    return Err(e);
                }
            }
            if self.data.seen_count() >= self.search_space.size() {
                // Every index has a recorded outcome; the space can't be explored any further
                // regardless of what the abort condition or technique think.
                self.terminate();
                break;
            }
            if abort.should_stop(&self.data) {
                if !self.silent {
                    info!("abort condition `{}` fired", abort.name());
                }
                self.data.mark_terminated_early();
                self.terminate();
                break;
            }
        }
        Ok(&self.data)
    }

    /// Advances the tuning loop by exactly one technique step: one `get_next` /
    /// evaluate-each-proposal / `report_costs` cycle. Does not consult any abort condition; the
    /// host is expected to decide when to stop calling this (program-guided tuning).
    pub fn make_step(&mut self, cost_fn: &mut dyn FnMut(&Configuration) -> CostResult) -> Result<Step> {
        self.enter_running()?;
        if !self.technique_initialized {
            self.initialize_technique();
        }
        let outcome = self.step(cost_fn)?;
        if outcome == Step::Exhausted {
            self.terminate();
        }
        Ok(outcome)
    }

    fn enter_running(&mut self) -> Result<()> {
        match self.state {
            State::Terminated => Err(Error::AlreadyTerminated),
            State::Configured => {
                self.state = State::Running;
                Ok(())
            }
            State::Running => Ok(()),
        }
    }

    fn terminate(&mut self) {
        if self.state != State::Terminated {
            self.state = State::Terminated;
            match &mut self.technique {
                Technique::Index(t) => t.finalize(),
                Technique::Coordinate(t) => t.finalize(),
            }
        }
    }

    fn initialize_technique(&mut self) {
        match &mut self.technique {
            Technique::Index(t) => t.initialize(self.search_space.size()),
            Technique::Coordinate(t) => t.initialize(self.search_space.parameters().len()),
        }
        self.technique_initialized = true;
    }

    /// One proposal/evaluate/report cycle.
    fn step(&mut self, cost_fn: &mut dyn FnMut(&Configuration) -> CostResult) -> Result<Step> {
        match &mut self.technique {
            Technique::Index(_) => self.step_index(cost_fn),
            Technique::Coordinate(_) => self.step_coordinate(cost_fn),
        }
    }

    fn step_index(&mut self, cost_fn: &mut dyn FnMut(&Configuration) -> CostResult) -> Result<Step> {
        let Technique::Index(technique) = &mut self.technique else {
            unreachable!()
        };
        let proposals = technique.get_next_indices();
        if proposals.is_empty() {
            return Ok(Step::Exhausted);
        }

        let mut report = std::collections::HashMap::with_capacity(proposals.len());
        for idx in proposals {
            let config = self.search_space.index_to_config(idx);
            let cost = self.evaluate_or_reuse(idx, config, cost_fn)?;
            report.insert(idx, cost);
        }

        let Technique::Index(technique) = &mut self.technique else {
            unreachable!()
        };
        technique.report_costs(report);
        Ok(Step::Continued)
    }

    fn step_coordinate(&mut self, cost_fn: &mut dyn FnMut(&Configuration) -> CostResult) -> Result<Step> {
        let Technique::Coordinate(technique) = &mut self.technique else {
            unreachable!()
        };
        let proposals = technique.get_next_coordinates();
        if proposals.is_empty() {
            return Ok(Step::Exhausted);
        }

        let mut report = Vec::with_capacity(proposals.len());
        for coord in proposals {
            let config = self.search_space.coord_to_config(&coord);
            let idx = self
                .search_space
                .config_to_index(&config)
                .expect("coord_to_config always yields a path present in the tree");
            let cost = self.evaluate_or_reuse(idx, config, cost_fn)?;
            report.push((coord, cost));
        }

        let Technique::Coordinate(technique) = &mut self.technique else {
            unreachable!()
        };
        technique.report_costs(report);
        Ok(Step::Continued)
    }

    /// Evaluates `config` via `cost_fn`, unless it already has a recorded *valid* cost, in which
    /// case that cached cost is reused and the cost function isn't called again. Previously
    /// `Invalid` configurations are re-queried, per §4.6.
    fn evaluate_or_reuse(
        &mut self,
        idx: u64,
        config: Configuration,
        cost_fn: &mut dyn FnMut(&Configuration) -> CostResult,
    ) -> Result<Cost> {
        if let Some(cached) = self.data.valid_cost(idx) {
            return Ok(cached);
        }

        let outcome = match cost_fn(&config) {
            Ok(cost) => Outcome::Valid(cost),
            Err(CostError::InvalidConfiguration) => {
                debug!("invalid configuration `{config}`");
                Outcome::Invalid
            }
            Err(CostError::Other(source)) => {
                warn!("cost function failed for `{config}`: {source}");
                return Err(Error::CostFunction {
                    configuration: config,
                    source,
                });
            }
        };

        let reported = match &outcome {
            Outcome::Valid(cost) => *cost,
            Outcome::Invalid => self.data.penalty_cost(),
        };

        if let Some(sink) = &mut self.log_sink {
            sink.log_outcome(&config, &outcome);
        }
        self.data.record(idx, config, outcome);
        Ok(reported)
    }
}
