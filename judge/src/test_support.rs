//! Test-only helpers for building requests and judging in a private scratch root.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::types::{ExecutionRequest, JudgeOutcome, TestCase};
use crate::io::config::JudgeConfig;
use crate::judge::Judge;

/// Build a test case from a JSON array of arguments and an expected value.
pub fn case(input: Value, output: Value) -> TestCase {
    let input = match input {
        Value::Array(items) => items,
        other => vec![other],
    };
    TestCase { input, output }
}

pub fn request(source: &str, tests: Vec<TestCase>) -> ExecutionRequest {
    ExecutionRequest::new(source, tests).expect("test request should be valid")
}

/// A Python judge whose scratch directories live under a private temp root.
pub struct TestJudge {
    pub judge: Judge,
    scratch_root: TempDir,
}

impl TestJudge {
    pub fn new() -> Result<Self> {
        let scratch_root = tempfile::tempdir()?;
        let judge = Judge::new(JudgeConfig {
            scratch_dir: Some(scratch_root.path().to_path_buf()),
            ..JudgeConfig::default()
        });
        Ok(Self {
            judge,
            scratch_root,
        })
    }

    pub fn with_output_limit(mut self, output_limit_bytes: usize) -> Self {
        let config = JudgeConfig {
            output_limit_bytes,
            ..self.judge.config().clone()
        };
        self.judge = Judge::new(config);
        self
    }

    pub fn run_python(&self, request: &ExecutionRequest, timeout: Duration) -> Result<JudgeOutcome> {
        let harness = self
            .judge
            .harness("python")
            .ok_or_else(|| anyhow!("python harness unavailable"))?;
        self.judge.judge(harness.as_ref(), request, timeout)
    }

    pub fn scratch_root(&self) -> &Path {
        self.scratch_root.path()
    }

    /// Number of entries left behind in the scratch root.
    pub fn leftover_scratch(&self) -> usize {
        fs::read_dir(self.scratch_root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
