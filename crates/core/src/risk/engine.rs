//! End-to-end post-fire risk assessment
//!
//! One assessment walks a fixed sequence of stages:
//!
//! 1. **Baseline run**: simulate the most erodible scenario over the full
//!    climate record to get an annual-maxima runoff series.
//! 2. **Extreme-year selection**: pick the years at runoff ranks 5, 10, 20, 50
//!    and 75 and the date of each year's largest event.
//! 3. **Climate truncation**: have the climate source write a record holding
//!    only those years.
//! 4. **Scenario fan-out**: simulate every (pattern, bin) combination of the
//!    burn-severity class against the short record.
//! 5. **Aggregation**: build the risk curves while the baseline summary and
//!    the enriched annual-maxima view are prepared alongside.
//!
//! Any failure ends the assessment; no partial result is returned.

use crate::config::EngineConfig;
use crate::core_types::{BurnSeverity, EventDate};
use crate::error::{Result, RiskError};
use crate::report::event_log::{annual_maxima, parse_events, AnnualMaxima};
use crate::report::return_interval::select_ranked;
use crate::report::soil_loss::{parse_soil_loss_report, ReportOptions, SoilLossReport};
use crate::risk::aggregator::{representative_years, RiskAggregator, RiskCurves, CLIMATE_RANKS};
use crate::risk::recovery::RECOVERY;
use crate::scenario::inputs::{ClimateSource, ScenarioBuilder};
use crate::scenario::invoker::SimulationInvoker;
use crate::scenario::scheduler::{ScenarioBatch, ScenarioScheduler, TaggedEvent};
use crate::scenario::space::ScenarioSpace;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Stage of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    BaselineRun,
    ExtremeYearSelection,
    ClimateTruncation,
    ScenarioFanout,
    Aggregation,
    Done,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaselineRun => "baseline run",
            Self::ExtremeYearSelection => "extreme-year selection",
            Self::ClimateTruncation => "climate truncation",
            Self::ScenarioFanout => "scenario fan-out",
            Self::Aggregation => "aggregation",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Hillslope to assess
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskRequest {
    pub burn_severity: BurnSeverity,
    /// Hillslope length in metres
    pub slope_length_m: f64,
}

impl RiskRequest {
    /// # Errors
    /// Returns `InvalidRequest` unless the slope length is a positive number.
    pub fn validate(&self) -> Result<()> {
        if self.slope_length_m.is_finite() && self.slope_length_m > 0.0 {
            Ok(())
        } else {
            Err(RiskError::InvalidRequest(format!(
                "slope length must be positive, got {}",
                self.slope_length_m
            )))
        }
    }
}

/// Result of one assessment
#[derive(Debug, Serialize)]
pub struct RiskAssessment {
    /// Baseline report normalized by the slope length
    pub summary: SoilLossReport,
    /// Baseline annual maxima with peak intensities
    pub ebe_events: AnnualMaxima,
    /// Representative dates, `M/D/Y`, in climate-rank order
    pub selected_dates: Vec<String>,
    /// Every tagged scenario event, largest delivery first
    pub sed_results: Vec<TaggedEvent>,
    pub probabilities: RiskCurves,
    /// Scenario failures dropped under the skip policy
    #[serde(skip)]
    pub failures: Vec<RiskError>,
}

/// Drives assessments against a set of collaborators
pub struct RiskEngine<'a> {
    config: EngineConfig,
    builder: &'a dyn ScenarioBuilder,
    invoker: &'a dyn SimulationInvoker,
    climate: &'a dyn ClimateSource,
}

impl<'a> RiskEngine<'a> {
    pub fn new(
        config: EngineConfig,
        builder: &'a dyn ScenarioBuilder,
        invoker: &'a dyn SimulationInvoker,
        climate: &'a dyn ClimateSource,
    ) -> Self {
        Self {
            config,
            builder,
            invoker,
            climate,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every stage for one hillslope
    ///
    /// # Errors
    /// Returns the first stage failure: `InvalidRequest`, `InsufficientRecords`
    /// when the baseline has fewer than 75 runoff years, `ScenarioTask`,
    /// `ExternalTool`, `Parse` or `Io`.
    pub fn assess(&self, request: &RiskRequest) -> Result<RiskAssessment> {
        request.validate()?;
        let space = ScenarioSpace::for_severity(request.burn_severity);
        let (base_pattern, base_bin) = space.baseline();

        let mut state = EngineState::BaselineRun;
        info!(%state, severity = %request.burn_severity, pattern = %base_pattern, bin = %base_bin, "entering stage");
        let scenario = self.builder.build(
            base_pattern,
            base_bin,
            self.climate.climate_file(),
            self.climate.simulated_years(),
        )?;
        let baseline = self.invoker.run(&scenario)?;
        let baseline_events = parse_events(&baseline.event_log)?;
        let ranked = annual_maxima(&baseline_events, None);
        info!(%state, years_with_runoff = ranked.num_years_with_runoff_event, "stage complete");

        state = EngineState::ExtremeYearSelection;
        let selected = select_ranked(&ranked.annual_maxima_events, &CLIMATE_RANKS)?;
        let dates: Vec<EventDate> = selected.iter().map(|e| e.event.date()).collect();
        let years = representative_years(&dates);
        info!(%state, dates = %join_dates(&dates), "stage complete");

        state = EngineState::ClimateTruncation;
        let selected_years: Vec<i32> = dates.iter().map(|d| d.year).collect();
        let truncated = self.climate.truncate(&selected_years)?;
        info!(%state, path = %truncated.path.display(), years = truncated.years.len(), "stage complete");

        state = EngineState::ScenarioFanout;
        let scheduler = ScenarioScheduler::new(self.builder, self.invoker)
            .with_max_workers(self.config.max_workers)
            .with_policy(self.config.failure_policy);
        let batch: ScenarioBatch = if request.burn_severity == BurnSeverity::Unburned {
            scheduler.run_single(base_pattern, base_bin, &truncated, &years)?
        } else {
            scheduler.run(&space.combinations(), &truncated, &years)?
        };
        if !batch.failures.is_empty() {
            warn!(%state, failed = batch.failures.len(), of = batch.tasks, "scenarios dropped");
        }
        info!(%state, tasks = batch.tasks, events = batch.results.len(), "stage complete");

        state = EngineState::Aggregation;
        let aggregator = RiskAggregator::new(space, &RECOVERY, self.climate.is_monsoonal());
        let options = ReportOptions {
            slope_length_m: Some(request.slope_length_m),
            road_width_m: None,
            return_intervals: self.config.return_intervals.clone(),
        };
        let (probabilities, (summary, ebe_events)) = rayon::join(
            || aggregator.aggregate(&years, &batch.results),
            || {
                rayon::join(
                    || parse_soil_loss_report(&baseline.report, &options),
                    || {
                        self.climate
                            .peak_intensities()
                            .map(|peaks| annual_maxima(&baseline_events, Some(&peaks)))
                    },
                )
            },
        );
        let summary = summary?;
        let ebe_events = ebe_events?;
        info!(%state, "stage complete");

        state = EngineState::Done;
        info!(%state, severity = %request.burn_severity, "assessment complete");

        Ok(RiskAssessment {
            summary,
            ebe_events,
            selected_dates: dates.iter().map(ToString::to_string).collect(),
            sed_results: batch.results,
            probabilities,
            failures: batch.failures,
        })
    }
}

fn join_dates(dates: &[EventDate]) -> String {
    dates.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
