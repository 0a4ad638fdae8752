//! Caller-facing submission report.

use serde::{Deserialize, Serialize};

use crate::core::types::{ExecutionResult, JudgeOutcome};

/// Flattened view of an outcome for API responses.
///
/// Aborted runs report `passed = 0`, the declared test count as `total`, no
/// results and an `error` string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub passed: usize,
    pub total: usize,
    pub results: Vec<ExecutionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmissionReport {
    /// Report for a submission that never reached the judge.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            passed: 0,
            total: 0,
            results: Vec::new(),
            error: Some(error.into()),
        }
    }
}

impl JudgeOutcome {
    pub fn into_report(self, declared_tests: usize) -> SubmissionReport {
        let error = self.error_text();
        match self {
            JudgeOutcome::Completed {
                passed_count,
                total_count,
                results,
            } => SubmissionReport {
                passed: passed_count,
                total: total_count,
                results,
                error: None,
            },
            _ => SubmissionReport {
                passed: 0,
                total: declared_tests,
                results: Vec::new(),
                error,
            },
        }
    }
}
