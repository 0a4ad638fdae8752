//! Single-submission judge orchestration.
//!
//! Coordinates harness synthesis, the scratch directory, the isolated child
//! process and payload classification. Candidate failures come back as a
//! [`JudgeOutcome`]; only judge-side problems are `Err`.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, instrument, warn};

use crate::core::payload::{CapturedRun, classify};
use crate::core::types::{ExecutionRequest, JudgeOutcome};
use crate::harness::{Harness, harness_for};
use crate::io::config::JudgeConfig;
use crate::io::process::{CommandOutput, isolate, millis, run_command_with_timeout};
use crate::io::scratch::ScratchDir;

/// Stateless judge; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Judge {
    config: JudgeConfig,
}

impl Judge {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    pub fn harness(&self, language: &str) -> Option<Box<dyn Harness>> {
        harness_for(language, &self.config)
    }

    /// Run `request` through `harness` with a wall-clock budget for the whole test run.
    #[instrument(skip_all, fields(
        language = harness.language(),
        tests = request.tests().len(),
        timeout_ms = millis(timeout),
    ))]
    pub fn judge(
        &self,
        harness: &dyn Harness,
        request: &ExecutionRequest,
        timeout: Duration,
    ) -> Result<JudgeOutcome> {
        if timeout.is_zero() {
            bail!("judge timeout must be > 0");
        }
        let script = harness
            .synthesize(request)
            .with_context(|| format!("synthesize {} harness", harness.language()))?;

        let scratch = ScratchDir::create(self.config.scratch_dir.as_deref())?;
        let harness_path = scratch.write_file(harness.file_name(), &script)?;
        let mut cmd = harness.command(&harness_path);
        isolate(&mut cmd, scratch.path());

        let output = run_command_with_timeout(cmd, timeout, self.config.output_limit_bytes)
            .context("run harness")?;
        let outcome = classify(
            &CapturedRun {
                stdout: &output.stdout,
                stdout_truncated: output.stdout_truncated,
                timed_out: output.timed_out,
            },
            request.tests(),
        );
        log_outcome(&outcome, &output);

        if let Err(err) = scratch.close() {
            warn!(err = %format!("{err:#}"), "failed to remove scratch dir");
        }
        Ok(outcome)
    }
}

fn log_outcome(outcome: &JudgeOutcome, output: &CommandOutput) {
    match outcome {
        JudgeOutcome::Completed {
            passed_count,
            total_count,
            ..
        } => info!(passed = passed_count, total = total_count, "submission completed"),
        JudgeOutcome::RuntimeError { message } => {
            info!(message = %message, "submission raised");
        }
        JudgeOutcome::Timeout => info!("submission timed out"),
        JudgeOutcome::MalformedOutput { raw } => warn!(
            exit_code = ?output.status.code(),
            stdout_bytes = raw.len(),
            stdout_truncated = output.stdout_truncated,
            stderr = %output.stderr_excerpt(),
            "harness produced malformed output"
        ),
    }
}
