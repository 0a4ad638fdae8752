//! Judge configuration stored as TOML.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// Judge configuration (TOML).
///
/// Missing fields default to values suitable for a single small host.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JudgeConfig {
    /// Wall-clock budget for one whole submission, in milliseconds.
    pub timeout_ms: u64,

    /// Harness stdout beyond this many bytes makes the run malformed.
    pub output_limit_bytes: usize,

    /// Upper bound on concurrently running harness processes.
    pub max_concurrent_runs: usize,

    /// Interpreter used by the Python harness.
    pub python: PathBuf,

    /// Parent directory for per-run scratch directories. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            output_limit_bytes: 1_000_000,
            max_concurrent_runs: 4,
            python: PathBuf::from("python3"),
            scratch_dir: None,
        }
    }
}

impl JudgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(anyhow!("timeout_ms must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.max_concurrent_runs == 0 {
            return Err(anyhow!("max_concurrent_runs must be > 0"));
        }
        if self.python.as_os_str().is_empty() {
            return Err(anyhow!("python must name an interpreter"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `JudgeConfig::default()`.
pub fn load_config(path: &Path) -> Result<JudgeConfig> {
    if !path.exists() {
        let cfg = JudgeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: JudgeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, JudgeConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("judge.toml");
        fs::write(&path, "timeout_ms = 500\npython = \"/usr/bin/python3\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.timeout(), Duration::from_millis(500));
        assert_eq!(cfg.python, PathBuf::from("/usr/bin/python3"));
        assert_eq!(
            cfg.max_concurrent_runs,
            JudgeConfig::default().max_concurrent_runs
        );
        assert_eq!(cfg.scratch_dir, None);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("judge.toml");
        fs::write(&path, "max_concurrent_runs = 0\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("max_concurrent_runs"));
    }
}
