//! Error types for report parsing, scenario execution and risk assembly
//!
//! Every stage of a risk assessment is fatal on failure: nothing is retried and
//! no partial assessment is ever returned. Variants carry enough context (file,
//! section, line, year, scenario) to diagnose the failure from the message alone.

use std::path::PathBuf;

/// Convenience alias used across the crate
pub type Result<T, E = RiskError> = std::result::Result<T, E>;

/// Errors that can occur while assessing post-fire erosion risk
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    /// A report or event log is missing a section or holds a malformed field
    #[error("parse error in {section} at line {line}, field '{field}': {reason}")]
    Parse {
        /// Literal section header (or log name) being read
        section: String,
        /// 1-based line number in the source text
        line: usize,
        /// Field that could not be read
        field: String,
        /// What went wrong
        reason: String,
    },

    /// Too few simulated years for the requested return period or rank
    #[error("insufficient records: {requested} needed but only {available} available")]
    InsufficientRecords {
        /// Records needed: the 1-based rank, or the years an interval needs
        requested: usize,
        /// Number of records available
        available: usize,
    },

    /// One concurrent scenario task failed, aborting the batch
    #[error("scenario task {pattern}{bin} failed: {source}")]
    ScenarioTask {
        /// Spatial severity code of the failed task
        pattern: String,
        /// Soil bin of the failed task
        bin: u8,
        /// Underlying failure
        #[source]
        source: Box<RiskError>,
    },

    /// The external simulator is absent or did not report success
    #[error("external tool {tool} failed: {detail}")]
    ExternalTool {
        /// Executable that was invoked
        tool: String,
        /// Diagnostic output or reason
        detail: String,
    },

    /// Filesystem failure on an artifact
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Invalid engine configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid assessment request
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RiskError {
    /// Build a parse error
    pub fn parse(
        section: impl Into<String>,
        line: usize,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            section: section.into(),
            line,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap an i/o error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
