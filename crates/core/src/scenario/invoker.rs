//! Simulator invocation
//!
//! [`SimulationInvoker`] is the seam to the opaque erosion simulator. The
//! process-backed [`WeppInvoker`] answers the simulator's interactive prompts
//! from a run script on stdin, requires the success marker on stdout, and
//! memoizes outputs in the [`ArtifactCache`] under a hash of the run inputs.
//! The simulator runs in a scratch directory, so every input path is made
//! absolute before it reaches the run script.

use crate::config::EngineConfig;
use crate::error::{Result, RiskError};
use crate::scenario::cache::{content_key, ArtifactCache};
use crate::scenario::inputs::Scenario;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info};

const SUCCESS_MARKER: &str = "SUCCESSFUL";
const REPORT_FILE: &str = "soil_loss.dat";
const EVENT_LOG_FILE: &str = "events.ebe";

/// Raw text produced by one simulator run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutput {
    /// Annual soil-loss report
    pub report: String,
    /// Event-by-event log
    pub event_log: String,
}

/// Runs one scenario through the erosion simulator
pub trait SimulationInvoker: Send + Sync {
    /// Simulate `scenario` and return its report and event log
    ///
    /// # Errors
    /// Returns `ExternalTool` if the simulator is missing or fails, `Io` on file errors.
    fn run(&self, scenario: &Scenario) -> Result<SimulationOutput>;
}

/// Invokes a WEPP executable as a child process
#[derive(Debug, Clone)]
pub struct WeppInvoker {
    binary: PathBuf,
    cache: ArtifactCache,
}

impl WeppInvoker {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, cache: ArtifactCache) -> Self {
        Self {
            binary: binary.into(),
            cache,
        }
    }

    /// Invoker for the configured executable, caching in the configured work directory
    ///
    /// # Errors
    /// Returns `Io` if the work directory cannot be created.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(&config.wepp_binary, ArtifactCache::open(&config.work_dir)?))
    }

    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }

    /// The scenario with every input path canonicalized
    fn resolve(scenario: &Scenario) -> Result<Scenario> {
        let absolute = |path: &Path| fs::canonicalize(path).map_err(|e| RiskError::io(path, e));
        Ok(Scenario {
            label: scenario.label.clone(),
            soil: absolute(&scenario.soil)?,
            slope: absolute(&scenario.slope)?,
            management: absolute(&scenario.management)?,
            climate: absolute(&scenario.climate)?,
            years: scenario.years,
        })
    }

    /// Hash of the executable and every input file's contents
    fn run_key(&self, scenario: &Scenario) -> Result<String> {
        let mut parts: Vec<Vec<u8>> = vec![
            self.binary.display().to_string().into_bytes(),
            scenario.years.to_string().into_bytes(),
        ];
        for path in [&scenario.soil, &scenario.slope, &scenario.management, &scenario.climate] {
            parts.push(fs::read(path).map_err(|e| RiskError::io(path, e))?);
        }
        Ok(content_key(&parts))
    }

    /// Answers to the simulator prompts: metric units, continuous hillslope run,
    /// detailed annual output and an event-by-event log, routing all events.
    fn run_script(scenario: &Scenario) -> String {
        let answers = [
            "m".to_string(), // metric units
            "y".to_string(), // not a watershed
            "1".to_string(), // continuous simulation
            "1".to_string(), // hillslope
            "n".to_string(), // hillslope pass file
            "2".to_string(), // detailed annual output
            "n".to_string(), // initial conditions file
            REPORT_FILE.to_string(),
            "n".to_string(), // water balance
            "n".to_string(), // crop
            "n".to_string(), // soil
            "n".to_string(), // distance/sediment loss
            "n".to_string(), // large graphics
            "y".to_string(), // event-by-event output
            EVENT_LOG_FILE.to_string(),
            "n".to_string(), // element output
            "n".to_string(), // final summary
            "n".to_string(), // daily winter
            "n".to_string(), // plant yield
            scenario.management.display().to_string(),
            scenario.slope.display().to_string(),
            scenario.climate.display().to_string(),
            scenario.soil.display().to_string(),
            "0".to_string(), // no irrigation
            scenario.years.to_string(),
            "0".to_string(), // route all events
        ];
        answers.join("\n")
    }

    fn execute(&self, scenario: &Scenario, key: &str) -> Result<()> {
        if !self.binary.is_file() {
            return Err(RiskError::ExternalTool {
                tool: self.tool_name(),
                detail: "simulator executable not found".to_string(),
            });
        }

        let binary = fs::canonicalize(&self.binary).map_err(|e| RiskError::io(&self.binary, e))?;
        let scratch = tempfile::tempdir_in(self.cache.dir()).map_err(|e| RiskError::io(self.cache.dir(), e))?;
        let run_path = self
            .cache
            .get_or_write(key, "run", || Self::run_script(scenario))?;
        let stdout_path = scratch.path().join("run.stout");
        let stderr_path = scratch.path().join("run.sterr");

        let stdin = File::open(&run_path).map_err(|e| RiskError::io(&run_path, e))?;
        let stdout = File::create(&stdout_path).map_err(|e| RiskError::io(&stdout_path, e))?;
        let stderr = File::create(&stderr_path).map_err(|e| RiskError::io(&stderr_path, e))?;

        debug!(scenario = %scenario.label, dir = %scratch.path().display(), "starting simulator");
        let status = Command::new(&binary)
            .current_dir(scratch.path())
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()
            .map_err(|e| RiskError::ExternalTool {
                tool: self.tool_name(),
                detail: e.to_string(),
            })?;

        let stdout_text = fs::read_to_string(&stdout_path).map_err(|e| RiskError::io(&stdout_path, e))?;
        if !status.success() || !stdout_text.contains(SUCCESS_MARKER) {
            let stderr_text = fs::read_to_string(&stderr_path).unwrap_or_default();
            return Err(RiskError::ExternalTool {
                tool: self.tool_name(),
                detail: format!(
                    "{} ({status}) without success marker\n{stdout_text}{stderr_text}",
                    scenario.label
                ),
            });
        }

        // Event log first: the report's presence marks a complete cache entry
        self.cache
            .adopt(&scratch.path().join(EVENT_LOG_FILE), key, "ebe")?;
        self.cache.adopt(&scratch.path().join(REPORT_FILE), key, "dat")?;
        Ok(())
    }
}

impl SimulationInvoker for WeppInvoker {
    fn run(&self, scenario: &Scenario) -> Result<SimulationOutput> {
        let scenario = &Self::resolve(scenario)?;
        let key = self.run_key(scenario)?;
        let report_path = self.cache.path_for(&key, "dat");
        let event_path = self.cache.path_for(&key, "ebe");

        if report_path.exists() && event_path.exists() {
            debug!(scenario = %scenario.label, "reusing memoized simulator output");
        } else {
            self.execute(scenario, &key)?;
            info!(scenario = %scenario.label, years = scenario.years, "simulator run complete");
        }

        Ok(SimulationOutput {
            report: fs::read_to_string(&report_path).map_err(|e| RiskError::io(&report_path, e))?,
            event_log: fs::read_to_string(&event_path).map_err(|e| RiskError::io(&event_path, e))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Shell stand-in for the simulator
    ///
    /// Counts its runs in `calls`, fails like the real binary when an input
    /// path on script lines 20-23 cannot be opened, and writes both outputs
    /// into its working directory. The success banner is printed only when
    /// `succeed` is set.
    #[cfg(unix)]
    fn fake_wepp(dir: &Path, succeed: bool) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let calls = dir.join("calls");
        let banner = if succeed {
            "echo 'WEPP COMPLETED HILLSLOPE SIMULATION SUCCESSFULLY'"
        } else {
            "echo 'WEPP stopped early'"
        };
        let script = format!(
            "#!/bin/sh\n\
             echo run >> '{}'\n\
             i=0\n\
             while IFS= read -r line; do\n\
             i=$((i + 1))\n\
             if [ $i -ge 20 ] && [ $i -le 23 ] && [ ! -r \"$line\" ]; then echo \"cannot open $line\"; exit 0; fi\n\
             done\n\
             echo 'annual report' > {REPORT_FILE}\n\
             echo 'event log' > {EVENT_LOG_FILE}\n\
             {banner}\n",
            calls.display()
        );
        let path = dir.join("fake-wepp");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    fn call_count(dir: &Path) -> usize {
        fs::read_to_string(dir.join("calls"))
            .map(|text| text.lines().count())
            .unwrap_or(0)
    }

    #[cfg(unix)]
    fn only_files_in(dir: &Path) -> bool {
        fs::read_dir(dir)
            .unwrap()
            .all(|entry| entry.unwrap().file_type().unwrap().is_file())
    }

    fn scenario_in(dir: &Path) -> Scenario {
        let mut paths = Vec::new();
        for name in ["a.sol", "a.slp", "a.man", "a.cli"] {
            let path = dir.join(name);
            fs::write(&path, name).unwrap();
            paths.push(path);
        }
        Scenario {
            label: "hhh4".to_string(),
            soil: paths[0].clone(),
            slope: paths[1].clone(),
            management: paths[2].clone(),
            climate: paths[3].clone(),
            years: 100,
        }
    }

    #[test]
    fn test_run_script_answers() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let script = WeppInvoker::run_script(&scenario);
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines.len(), 26);
        assert_eq!(lines[0], "m");
        assert_eq!(lines[5], "2");
        assert_eq!(lines[7], REPORT_FILE);
        assert_eq!(lines[14], EVENT_LOG_FILE);
        assert_eq!(lines[24], "100");
    }

    #[test]
    fn test_missing_binary_is_external_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new(dir.path().join("no-such-wepp"), cache);

        let err = invoker.run(&scenario).unwrap_err();
        assert!(matches!(err, RiskError::ExternalTool { .. }));
    }

    #[test]
    fn test_memoized_outputs_skip_the_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new(dir.path().join("no-such-wepp"), cache.clone());

        let key = invoker.run_key(&scenario).unwrap();
        cache.get_or_write(&key, "dat", || "report".to_string()).unwrap();
        cache.get_or_write(&key, "ebe", || "events".to_string()).unwrap();

        let output = invoker.run(&scenario).unwrap();
        assert_eq!(output.report, "report");
        assert_eq!(output.event_log, "events");
    }

    #[test]
    fn test_run_key_tracks_input_contents() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new("wepp", cache);

        let before = invoker.run_key(&scenario).unwrap();
        fs::write(&scenario.soil, "changed").unwrap();
        assert_ne!(before, invoker.run_key(&scenario).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_run_is_cached_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new(fake_wepp(dir.path(), true), cache.clone());

        let output = invoker.run(&scenario).unwrap();
        assert_eq!(output.report, "annual report\n");
        assert_eq!(output.event_log, "event log\n");
        assert_eq!(call_count(dir.path()), 1);

        let key = invoker.run_key(&scenario).unwrap();
        assert!(cache.path_for(&key, "dat").is_file());
        assert!(cache.path_for(&key, "ebe").is_file());
        // Scratch run directory is gone
        assert!(only_files_in(cache.dir()));

        let again = invoker.run(&scenario).unwrap();
        assert_eq!(again, output);
        assert_eq!(call_count(dir.path()), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_success_marker_is_external_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = scenario_in(dir.path());
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new(fake_wepp(dir.path(), false), cache.clone());

        let err = invoker.run(&scenario).unwrap_err();
        let RiskError::ExternalTool { detail, .. } = err else {
            panic!("expected external tool error");
        };
        assert!(detail.contains("hhh4"));
        assert!(detail.contains("WEPP stopped early"));

        let key = invoker.run_key(&scenario).unwrap();
        assert!(!cache.path_for(&key, "dat").exists());
        assert!(!cache.path_for(&key, "ebe").exists());
        assert!(only_files_in(cache.dir()));
        assert_eq!(call_count(dir.path()), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_input_paths_reach_the_simulator() {
        let dir = tempfile::tempdir().unwrap();
        // Tests run from the package root, where the manifest is readable
        let relative = PathBuf::from("Cargo.toml");
        assert!(relative.is_relative() && relative.is_file());
        let scenario = Scenario {
            management: relative.clone(),
            ..scenario_in(dir.path())
        };
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new(fake_wepp(dir.path(), true), cache.clone());

        let output = invoker.run(&scenario).unwrap();
        assert_eq!(output.report, "annual report\n");

        let key = invoker.run_key(&WeppInvoker::resolve(&scenario).unwrap()).unwrap();
        let script = fs::read_to_string(cache.path_for(&key, "run")).unwrap();
        let management = script.lines().nth(19).unwrap();
        assert_eq!(Path::new(management), fs::canonicalize(&relative).unwrap());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let scenario = Scenario {
            soil: dir.path().join("absent.sol"),
            ..scenario_in(dir.path())
        };
        let cache = ArtifactCache::open(dir.path().join("work")).unwrap();
        let invoker = WeppInvoker::new("wepp", cache);

        let err = invoker.run(&scenario).unwrap_err();
        assert!(matches!(err, RiskError::Io { ref path, .. } if path.ends_with("absent.sol")));
    }
}
