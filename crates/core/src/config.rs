//! Engine configuration
//!
//! Loaded from JSON; every field has a default so a partial file is enough.

use crate::error::{Result, RiskError};
use crate::report::return_interval::DEFAULT_RETURN_INTERVALS;
use crate::scenario::scheduler::FailurePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings shared by every assessment an engine runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding hash-named simulator inputs and outputs
    pub work_dir: PathBuf,
    /// Simulator executable
    pub wepp_binary: PathBuf,
    /// Scenario pool size; `None` uses one worker per logical CPU
    pub max_workers: Option<usize>,
    pub failure_policy: FailurePolicy,
    /// Return intervals (years) reported for detailed simulator output
    pub return_intervals: Vec<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("erosion-risk"),
            wepp_binary: PathBuf::from("wepp"),
            max_workers: None,
            failure_policy: FailurePolicy::default(),
            return_intervals: DEFAULT_RETURN_INTERVALS.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read and `Config` if it is not valid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| RiskError::io(path, e))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| RiskError::Config(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(self).map_err(|e| RiskError::Config(e.to_string()))?;

        fs::write(path, contents).map_err(|e| RiskError::io(path, e))?;

        Ok(())
    }

    /// Reject settings no assessment could run with
    ///
    /// # Errors
    /// Returns `Config` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == Some(0) {
            return Err(RiskError::Config("max_workers must be at least 1".to_string()));
        }
        if self.return_intervals.iter().any(|t| !t.is_finite() || *t <= 0.0) {
            return Err(RiskError::Config(
                "return_intervals must be positive numbers of years".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{ "max_workers": 4, "failure_policy": "skip_failed" }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.max_workers, Some(4));
        assert_eq!(config.failure_policy, FailurePolicy::SkipFailed);
        assert_eq!(config.return_intervals, vec![1.0, 2.0, 5.0, 10.0]);
        assert_eq!(config.wepp_binary, PathBuf::from("wepp"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let config = EngineConfig {
            work_dir: dir.path().to_path_buf(),
            max_workers: Some(2),
            ..EngineConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        fs::write(&path, r#"{ "max_workers": 0 }"#).unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(RiskError::Config(_))));

        fs::write(&path, r#"{ "failure_policy": "retry" }"#).unwrap();
        assert!(matches!(EngineConfig::load(&path), Err(RiskError::Config(_))));

        assert!(matches!(
            EngineConfig::load(dir.path().join("missing.json")),
            Err(RiskError::Io { .. })
        ));
    }
}
