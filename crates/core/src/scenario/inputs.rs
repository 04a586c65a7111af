//! Interfaces to the collaborators that prepare simulator inputs
//!
//! Input-file templating and climate generation live outside this crate. The
//! engine only needs a scenario builder and a climate source behind these
//! traits.

use crate::core_types::{SoilBin, SpatialPattern};
use crate::error::Result;
use crate::report::event_log::PeakIntensity;
use std::path::{Path, PathBuf};

/// Fully prepared inputs of one simulator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Short name used in artifact names and logs, e.g. `hlh3`
    pub label: String,
    pub soil: PathBuf,
    pub slope: PathBuf,
    pub management: PathBuf,
    pub climate: PathBuf,
    /// Number of years to simulate
    pub years: usize,
}

/// Writes the soil, slope and management inputs for a (pattern, bin) combination
pub trait ScenarioBuilder: Send + Sync {
    /// Prepare a scenario simulating `years` years of `climate`
    ///
    /// # Errors
    /// Implementations report template or filesystem failures.
    fn build(&self, pattern: SpatialPattern, bin: SoilBin, climate: &Path, years: usize) -> Result<Scenario>;
}

/// Climate record restricted to the representative years
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncatedClimate {
    pub path: PathBuf,
    /// Original year of each simulated year: year `i + 1` of the short run is `years[i]`
    pub years: Vec<i32>,
}

/// Stochastic climate record for the hillslope location
pub trait ClimateSource: Send + Sync {
    /// Full-length climate file
    fn climate_file(&self) -> &Path;

    /// Number of years in the full-length record
    fn simulated_years(&self) -> usize;

    /// Whether the location has a monsoonal (summer-storm) precipitation regime
    fn is_monsoonal(&self) -> bool;

    /// Write a climate file holding only `years`
    ///
    /// # Errors
    /// Implementations report missing years or write failures.
    fn truncate(&self, years: &[i32]) -> Result<TruncatedClimate>;

    /// Daily 10/30/60-minute peak intensities of the full record
    ///
    /// # Errors
    /// Implementations report unreadable climate records.
    fn peak_intensities(&self) -> Result<Vec<PeakIntensity>>;
}
