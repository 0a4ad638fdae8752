//! Shared data model for judge calls.
//!
//! These types are the contract between the harness, the classifier and the
//! callers. Values crossing the process boundary are plain JSON.

use anyhow::{Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One declared test: positional arguments and the expected return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Vec<Value>,
    pub output: Value,
}

/// Candidate source plus the tests it is judged against.
///
/// Construction checks the request is judgeable; after that it is read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    source: String,
    tests: Vec<TestCase>,
}

impl ExecutionRequest {
    pub fn new(source: impl Into<String>, tests: Vec<TestCase>) -> Result<Self> {
        if tests.is_empty() {
            bail!("execution request must declare at least one test case");
        }
        Ok(Self {
            source: source.into(),
            tests,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }
}

/// Result of one test case.
///
/// `got` is `None` when the harness did not report a value at all, which is
/// distinct from the candidate returning `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub ok: bool,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub got: Option<Value>,
    pub want: Value,
}

fn present_value<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Classified result of a single judge call.
///
/// Only `Completed` carries per-test data. Every other variant means the run
/// was aborted and nothing partial is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JudgeOutcome {
    Completed {
        passed_count: usize,
        total_count: usize,
        results: Vec<ExecutionResult>,
    },
    RuntimeError {
        message: String,
    },
    Timeout,
    MalformedOutput {
        raw: String,
    },
}

impl JudgeOutcome {
    /// True only for a completed run where every reported case passed.
    pub fn passed_all(&self) -> bool {
        match self {
            JudgeOutcome::Completed {
                passed_count,
                total_count,
                ..
            } => *total_count > 0 && passed_count == total_count,
            _ => false,
        }
    }

    /// Short user-facing explanation for aborted runs.
    pub fn error_text(&self) -> Option<String> {
        match self {
            JudgeOutcome::Completed { .. } => None,
            JudgeOutcome::RuntimeError { message } => Some(message.clone()),
            JudgeOutcome::Timeout => Some("timeout".to_string()),
            JudgeOutcome::MalformedOutput { .. } => {
                Some("malformed output: solution corrupted the result channel".to_string())
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            JudgeOutcome::Completed { .. } => "completed",
            JudgeOutcome::RuntimeError { .. } => "runtime_error",
            JudgeOutcome::Timeout => "timeout",
            JudgeOutcome::MalformedOutput { .. } => "malformed_output",
        }
    }
}
