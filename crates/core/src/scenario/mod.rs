//! Scenario space, simulator invocation and concurrent fan-out

pub mod cache;
pub mod inputs;
pub mod invoker;
pub mod scheduler;
pub mod space;

pub use cache::{content_key, ArtifactCache};
pub use inputs::{ClimateSource, Scenario, ScenarioBuilder, TruncatedClimate};
pub use invoker::{SimulationInvoker, SimulationOutput, WeppInvoker};
pub use scheduler::{FailurePolicy, RepresentativeYear, ScenarioBatch, ScenarioScheduler, TaggedEvent, TaskOutcome};
pub use space::{ScenarioSpace, YEARS_AFTER_FIRE};
