//! Parsers for the simulator's annual report and event-by-event log

pub mod event_log;
pub mod return_interval;
pub mod soil_loss;

pub use event_log::{annual_maxima, events_on_dates, parse_events, AnnualMaxima, AnnualMaximaEvent, EbeEvent, PeakIntensity};
pub use return_interval::{rec_intervals, select_ranked, weibull_ranks, ReturnPeriodTable, DEFAULT_RETURN_INTERVALS};
pub use soil_loss::{
    parse_soil_loss_report, simulator_version, AnnualAverages, AnnualRecord, DetailedReport, Measure, ReportOptions,
    RoadPrismErosion, SoilLossReport,
};
