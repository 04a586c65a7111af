//! Post-Fire Erosion Risk Core Library
//!
//! Forecasts hillslope erosion risk after a wildfire by running an opaque
//! erosion simulator (WEPP) over many scenarios and combining the results into
//! cumulative exceedance curves for each rehabilitation treatment.
//!
//! ## Layout
//!
//! - `report`: parsers for the simulator's annual report and event-by-event
//!   log, and Weibull return-interval ranking
//! - `scenario`: spatial severity patterns, soil bins, simulator invocation,
//!   the artifact cache and the concurrent scenario scheduler
//! - `risk`: treatment recovery tables, probability aggregation and the
//!   assessment state machine

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Simulator output parsing
pub mod report;

// Scenario enumeration and execution
pub mod scenario;

// Probability aggregation and the engine
pub mod risk;

// Re-export core types
pub use config::EngineConfig;
pub use core_types::{BurnSeverity, EventDate, SoilBin, SpatialPattern, Treatment, VegetationType};
pub use error::{Result, RiskError};

// Re-export report types
pub use report::{AnnualMaxima, EbeEvent, PeakIntensity, ReportOptions, SoilLossReport};

// Re-export scenario and engine types
pub use risk::{RiskAggregator, RiskAssessment, RiskCurves, RiskEngine, RiskRequest};
pub use scenario::{
    ArtifactCache, ClimateSource, FailurePolicy, Scenario, ScenarioBuilder, ScenarioScheduler, ScenarioSpace,
    SimulationInvoker, SimulationOutput, TaggedEvent, TruncatedClimate, WeppInvoker,
};
