//! Concurrent fan-out of scenario simulations
//!
//! Every (pattern, bin) task is an independent blocking simulator call. Tasks
//! run on a bounded rayon pool with no shared mutable state; each task returns
//! an explicit outcome and the fan-in applies the [`FailurePolicy`]. Completion
//! order is unspecified, so results are put in a deterministic order by a
//! stable sort after the fan-in.

use crate::core_types::{EventDate, SoilBin, SpatialPattern};
use crate::error::{Result, RiskError};
use crate::report::event_log::{events_on_dates, parse_events, EbeEvent};
use crate::scenario::inputs::{ScenarioBuilder, TruncatedClimate};
use crate::scenario::invoker::SimulationInvoker;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What the fan-in does when a task fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Fail the whole batch on the first failed task
    #[default]
    Abort,
    /// Drop failed tasks, log them and keep the rest
    SkipFailed,
}

/// One of the representative extreme years used as climate scenarios
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeYear {
    /// Rank of the year in descending annual-maximum runoff
    pub rank: usize,
    /// Probability weight of this climate scenario
    pub weight: f64,
    /// Date of the year's largest runoff event
    pub date: EventDate,
}

/// Simulated event tagged with the scenario that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaggedEvent {
    #[serde(rename = "spatial_severity")]
    pub pattern: SpatialPattern,
    #[serde(rename = "k")]
    pub bin: SoilBin,
    /// Rank of the representative year the event belongs to
    pub climate_rank: usize,
    #[serde(flatten)]
    pub event: EbeEvent,
}

/// Result of one scenario task
#[derive(Debug)]
pub struct TaskOutcome {
    pub pattern: SpatialPattern,
    pub bin: SoilBin,
    pub result: Result<Vec<TaggedEvent>>,
}

/// Fan-in of a scenario batch
#[derive(Debug, Default)]
pub struct ScenarioBatch {
    /// Tagged events sorted by descending sediment delivery
    pub results: Vec<TaggedEvent>,
    /// Failures dropped under [`FailurePolicy::SkipFailed`]
    pub failures: Vec<RiskError>,
    /// Number of tasks executed
    pub tasks: usize,
}

/// Fans scenario simulations out over a worker pool
pub struct ScenarioScheduler<'a> {
    builder: &'a dyn ScenarioBuilder,
    invoker: &'a dyn SimulationInvoker,
    max_workers: Option<usize>,
    policy: FailurePolicy,
}

impl<'a> ScenarioScheduler<'a> {
    pub fn new(builder: &'a dyn ScenarioBuilder, invoker: &'a dyn SimulationInvoker) -> Self {
        Self {
            builder,
            invoker,
            max_workers: None,
            policy: FailurePolicy::default(),
        }
    }

    /// Bound the pool; `None` uses one worker per logical CPU
    pub fn with_max_workers(mut self, max_workers: Option<usize>) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Simulate every combination against the truncated climate
    ///
    /// # Errors
    /// Returns `ScenarioTask` for the first failed task under [`FailurePolicy::Abort`],
    /// or `Config` if the worker pool cannot be built.
    pub fn run(
        &self,
        combinations: &[(SpatialPattern, SoilBin)],
        climate: &TruncatedClimate,
        years: &[RepresentativeYear],
    ) -> Result<ScenarioBatch> {
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("scenario-{i}"));
        if let Some(workers) = self.max_workers {
            builder = builder.num_threads(workers);
        }
        let pool = builder
            .build()
            .map_err(|e| RiskError::Config(format!("cannot build scenario pool: {e}")))?;

        info!(
            tasks = combinations.len(),
            workers = pool.current_num_threads(),
            "fanning out scenarios"
        );
        let outcomes: Vec<TaskOutcome> = pool.install(|| {
            combinations
                .par_iter()
                .map(|&(pattern, bin)| self.run_task(pattern, bin, climate, years))
                .collect()
        });
        self.fan_in(outcomes)
    }

    /// Simulate a single combination on the calling thread
    ///
    /// # Errors
    /// As [`Self::run`].
    pub fn run_single(
        &self,
        pattern: SpatialPattern,
        bin: SoilBin,
        climate: &TruncatedClimate,
        years: &[RepresentativeYear],
    ) -> Result<ScenarioBatch> {
        let outcome = self.run_task(pattern, bin, climate, years);
        self.fan_in(vec![outcome])
    }

    fn run_task(
        &self,
        pattern: SpatialPattern,
        bin: SoilBin,
        climate: &TruncatedClimate,
        years: &[RepresentativeYear],
    ) -> TaskOutcome {
        TaskOutcome {
            pattern,
            bin,
            result: self.simulate(pattern, bin, climate, years),
        }
    }

    fn simulate(
        &self,
        pattern: SpatialPattern,
        bin: SoilBin,
        climate: &TruncatedClimate,
        years: &[RepresentativeYear],
    ) -> Result<Vec<TaggedEvent>> {
        let scenario = self
            .builder
            .build(pattern, bin, &climate.path, climate.years.len())?;
        let output = self.invoker.run(&scenario)?;
        let events = parse_events(&output.event_log)?;

        let dates: Vec<EventDate> = years.iter().map(|y| y.date).collect();
        let selected = events_on_dates(&events, &dates, &climate.years);
        debug!(%pattern, %bin, events = events.len(), "scenario parsed");

        Ok(years
            .iter()
            .zip(selected)
            .map(|(year, event)| TaggedEvent {
                pattern,
                bin,
                climate_rank: year.rank,
                event,
            })
            .collect())
    }

    fn fan_in(&self, outcomes: Vec<TaskOutcome>) -> Result<ScenarioBatch> {
        let mut batch = ScenarioBatch {
            tasks: outcomes.len(),
            ..ScenarioBatch::default()
        };

        for outcome in outcomes {
            match outcome.result {
                Ok(events) => batch.results.extend(events),
                Err(source) => {
                    let err = RiskError::ScenarioTask {
                        pattern: outcome.pattern.to_string(),
                        bin: outcome.bin.get(),
                        source: Box::new(source),
                    };
                    match self.policy {
                        FailurePolicy::Abort => return Err(err),
                        FailurePolicy::SkipFailed => {
                            warn!("dropping failed scenario: {err}");
                            batch.failures.push(err);
                        }
                    }
                }
            }
        }

        sort_by_delivery(&mut batch.results);
        Ok(batch)
    }
}

/// Stable sort by descending sediment delivery
pub fn sort_by_delivery(events: &mut [TaggedEvent]) {
    events.sort_by(|a, b| b.event.sed_del_kg_m.total_cmp(&a.event.sed_del_kg_m));
}
