//! Bounded dispatch of judge runs onto the blocking thread pool.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use judge::harness::Harness;
use judge::io::config::JudgeConfig;
use judge::{ExecutionRequest, Judge, JudgeOutcome};
use tokio::sync::Semaphore;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JudgeDispatcher {
    judge: Arc<Judge>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl JudgeDispatcher {
    pub fn new(config: JudgeConfig) -> Result<Self> {
        config.validate().context("invalid judge config")?;
        let permits = Arc::new(Semaphore::new(config.max_concurrent_runs));
        let timeout = config.timeout();
        Ok(Self {
            judge: Arc::new(Judge::new(config)),
            permits,
            timeout,
        })
    }

    pub fn harness(&self, language: &str) -> Option<Box<dyn Harness>> {
        self.judge.harness(language)
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Judge `request`, waiting for a free slot first.
    ///
    /// The permit travels with the blocking job, so dropping this future does
    /// not release it before the child process is reaped.
    pub async fn run(
        &self,
        harness: Box<dyn Harness>,
        request: ExecutionRequest,
    ) -> Result<JudgeOutcome> {
        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .context("judge dispatcher closed")?;
        debug!(available = self.permits.available_permits(), "judge slot acquired");

        let judge = Arc::clone(&self.judge);
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            judge.judge(harness.as_ref(), &request, timeout)
        })
        .await
        .context("judge worker panicked")?
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::process::Command;
    use std::time::Instant;

    use judge::TestCase;
    use serde_json::json;

    use super::*;

    struct SleepHarness;

    impl Harness for SleepHarness {
        fn language(&self) -> &'static str {
            "sh"
        }

        fn file_name(&self) -> &'static str {
            "harness.sh"
        }

        fn synthesize(&self, _request: &ExecutionRequest) -> Result<String> {
            Ok(r#"sleep 0.3; printf '{"results":[{"ok":true,"got":1,"want":1}]}'"#.to_string())
        }

        fn command(&self, harness_path: &Path) -> Command {
            let mut cmd = Command::new("sh");
            cmd.arg(harness_path);
            cmd
        }
    }

    fn dispatcher(max_concurrent_runs: usize, root: &Path) -> JudgeDispatcher {
        JudgeDispatcher::new(JudgeConfig {
            max_concurrent_runs,
            scratch_dir: Some(root.to_path_buf()),
            ..JudgeConfig::default()
        })
        .expect("dispatcher")
    }

    fn request() -> ExecutionRequest {
        ExecutionRequest::new(
            "ignored",
            vec![TestCase {
                input: vec![json!(1)],
                output: json!(1),
            }],
        )
        .expect("request")
    }

    #[tokio::test]
    async fn runs_are_bounded_by_permits() {
        let root = tempfile::tempdir().expect("tempdir");
        let dispatcher = dispatcher(2, root.path());

        let started = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..4 {
            let dispatcher = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                dispatcher.run(Box::new(SleepHarness), request()).await
            }));
        }
        for handle in handles {
            let outcome = handle.await.expect("join").expect("judge");
            assert!(outcome.passed_all());
        }

        // Four 300ms runs through two slots take at least two rounds.
        assert!(started.elapsed() >= Duration::from_millis(600));
        assert_eq!(dispatcher.available_permits(), 2);
    }

    #[tokio::test]
    async fn abandoned_run_holds_permit_until_done() {
        let root = tempfile::tempdir().expect("tempdir");
        let dispatcher = dispatcher(1, root.path());

        let abandoned = tokio::time::timeout(
            Duration::from_millis(50),
            dispatcher.run(Box::new(SleepHarness), request()),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(dispatcher.available_permits(), 0);

        let deadline = Instant::now() + Duration::from_secs(5);
        while dispatcher.available_permits() == 0 {
            assert!(Instant::now() < deadline, "permit never released");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(std::fs::read_dir(root.path()).expect("read_dir").count(), 0);
    }

    #[test]
    fn zero_permits_are_rejected() {
        let err = JudgeDispatcher::new(JudgeConfig {
            max_concurrent_runs: 0,
            ..JudgeConfig::default()
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("max_concurrent_runs"));
    }

    #[test]
    fn resolves_python_only() {
        let dispatcher = JudgeDispatcher::new(JudgeConfig::default()).expect("dispatcher");
        assert!(dispatcher.harness("python").is_some());
        assert!(dispatcher.harness("cpp").is_none());
    }
}
