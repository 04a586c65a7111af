//! Probability tables, aggregation and the assessment state machine

pub mod aggregator;
pub mod engine;
pub mod recovery;

pub use aggregator::{representative_years, RiskAggregator, RiskCurves, CLIMATE_RANKS, CLIMATE_WEIGHTS};
pub use engine::{EngineState, RiskAssessment, RiskEngine, RiskRequest};
pub use recovery::{RecoveryTables, RECOVERY};
