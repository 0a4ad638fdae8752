//! Harness payload parsing and outcome classification.
//!
//! The harness reports over stdout with exactly one JSON document that must
//! conform to `schemas/harness_payload/v1.schema.json`. Anything else is
//! treated as a corrupted result channel.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use jsonschema::{Draft, Validator};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::core::equality::values_equal;
use crate::core::types::{ExecutionResult, JudgeOutcome, TestCase};

const PAYLOAD_SCHEMA: &str = include_str!("../../../schemas/harness_payload/v1.schema.json");

static PAYLOAD_VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(PAYLOAD_SCHEMA).expect("harness payload schema should be json");
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .expect("harness payload schema should compile")
});

const FALLBACK_ERROR_MESSAGE: &str = "runtime error";

/// Decoded harness report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HarnessPayload {
    Failed { error: String },
    Finished { results: Vec<ExecutionResult> },
}

/// What the judge observed from one harness process.
#[derive(Debug, Clone, Copy)]
pub struct CapturedRun<'a> {
    pub stdout: &'a [u8],
    /// Bytes discarded beyond the output limit.
    pub stdout_truncated: usize,
    pub timed_out: bool,
}

/// Parse stdout into a payload, checking it against the payload schema.
pub fn parse_payload(raw: &str) -> Result<HarnessPayload> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("harness produced no output");
    }
    let value: Value = serde_json::from_str(trimmed).context("parse harness payload json")?;
    let messages: Vec<String> = PAYLOAD_VALIDATOR
        .iter_errors(&value)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!("harness payload schema violation:\n- {}", messages.join("\n- "));
    }
    serde_json::from_value(value).context("decode harness payload")
}

/// Classify a finished (or killed) harness run against the declared tests.
pub fn classify(run: &CapturedRun<'_>, tests: &[TestCase]) -> JudgeOutcome {
    if run.timed_out {
        return JudgeOutcome::Timeout;
    }
    let raw = String::from_utf8_lossy(run.stdout).into_owned();
    if run.stdout_truncated > 0 {
        debug!(
            truncated = run.stdout_truncated,
            "harness output exceeded limit"
        );
        return JudgeOutcome::MalformedOutput { raw };
    }

    let payload = match parse_payload(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            debug!(reason = %format!("{err:#}"), "harness payload rejected");
            return JudgeOutcome::MalformedOutput { raw };
        }
    };

    match payload {
        HarnessPayload::Failed { error } => {
            let message = if error.trim().is_empty() {
                FALLBACK_ERROR_MESSAGE.to_string()
            } else {
                error
            };
            JudgeOutcome::RuntimeError { message }
        }
        HarnessPayload::Finished { results } if results.len() > tests.len() => {
            debug!(
                reported = results.len(),
                declared = tests.len(),
                "harness reported more results than declared tests"
            );
            JudgeOutcome::MalformedOutput { raw }
        }
        HarnessPayload::Finished { results } => score(results, tests),
    }
}

/// Re-check every reported value against the declared expectation.
///
/// The harness `ok` and `want` fields are not trusted; the judge's own
/// equality and the declared outputs decide.
fn score(records: Vec<ExecutionResult>, tests: &[TestCase]) -> JudgeOutcome {
    let results: Vec<ExecutionResult> = records
        .into_iter()
        .zip(tests)
        .map(|(record, case)| {
            let ok = record
                .got
                .as_ref()
                .is_some_and(|got| values_equal(got, &case.output));
            ExecutionResult {
                ok,
                got: record.got,
                want: case.output.clone(),
            }
        })
        .collect();
    let passed_count = results.iter().filter(|result| result.ok).count();
    JudgeOutcome::Completed {
        passed_count,
        total_count: results.len(),
        results,
    }
}
