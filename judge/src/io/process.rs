//! Helpers for running harness processes with timeouts and bounded output.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

use crate::io::reaper;

const STDERR_EXCERPT_BYTES: usize = 2_000;
/// How long readers may keep draining once every process has been killed.
const READER_GRACE: Duration = Duration::from_millis(500);

/// Captured child process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Tail of stderr, for diagnostics only.
    pub fn stderr_excerpt(&self) -> String {
        let start = self.stderr.len().saturating_sub(STDERR_EXCERPT_BYTES);
        String::from_utf8_lossy(&self.stderr[start..])
            .trim()
            .to_string()
    }
}

/// Strip inherited state from a command that will run untrusted code.
///
/// The child sees an empty environment apart from `PATH` and a UTF-8 locale,
/// and runs inside `workdir`.
pub fn isolate(cmd: &mut Command, workdir: &Path) {
    cmd.env_clear().current_dir(workdir);
    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    cmd.env("LANG", "C.UTF-8")
        .env("HOME", workdir)
        .env("TMPDIR", workdir);
}

/// Run a command with a timeout and capture stdout/stderr without risking pipe deadlocks.
///
/// Stdin is closed. Output is read concurrently while the child runs;
/// `output_limit_bytes` bounds what is kept in memory per stream (the rest is
/// drained and counted). On unix the child leads its own process group and the
/// whole group is killed once the leader exits or times out. Descendants that
/// escaped the group are swept afterwards, and readers still blocked on a pipe
/// held open by a survivor are abandoned after a short grace period; that run
/// counts as timed out.
#[instrument(skip_all, fields(timeout_ms = millis(timeout), output_limit_bytes))]
pub fn run_command_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    output_limit_bytes: usize,
) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }
    reaper::become_subreaper();

    debug!("spawning child process");
    let mut child = {
        let mut leaders = reaper::leaders();
        match cmd.spawn() {
            Ok(c) => {
                leaders.insert(c.id());
                c
            }
            Err(e) => {
                error!(err = %e, "failed to spawn command");
                return Err(e).context("spawn command");
            }
        }
    };
    let leader = child.id();

    let streams = child
        .stdout
        .take()
        .zip(child.stderr.take())
        .ok_or_else(|| anyhow!("stdout and stderr were not piped"));
    let (stdout, stderr) = match streams {
        Ok(pipes) => pipes,
        Err(err) => {
            kill_process_group(&child);
            let _ = child.kill();
            let _ = child.wait();
            reaper::sweep_orphans(leader);
            return Err(err);
        }
    };

    let stdout_rx = spawn_reader(stdout, output_limit_bytes);
    let stderr_rx = spawn_reader(stderr, output_limit_bytes);

    let mut timed_out = false;
    let waited = match child.wait_timeout(timeout) {
        Ok(Some(status)) => {
            kill_process_group(&child);
            Ok(status)
        }
        Ok(None) => {
            warn!(timeout_ms = millis(timeout), "command timed out, killing");
            timed_out = true;
            kill_process_group(&child);
            if let Err(err) = child.kill() {
                warn!(err = %err, "failed to kill timed out command");
            }
            child.wait().context("wait command after kill")
        }
        Err(err) => {
            kill_process_group(&child);
            let _ = child.kill();
            let _ = child.wait();
            Err(err).context("wait for command")
        }
    };
    reaper::sweep_orphans(leader);
    let status = waited?;

    let grace = Instant::now() + READER_GRACE;
    let stdout = collect_output(&stdout_rx, grace).context("join stdout")?;
    let stderr = collect_output(&stderr_rx, grace).context("join stderr")?;
    if stdout.is_none() || stderr.is_none() {
        warn!("output pipes still held open after kill; abandoning readers");
        timed_out = true;
    }
    let (stdout, stdout_truncated) = stdout.unwrap_or_default();
    let (stderr, stderr_truncated) = stderr.unwrap_or_default();

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

/// Whole milliseconds of `duration`, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(unix)]
fn kill_process_group(child: &Child) {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(pgid) = i32::try_from(child.id()) else {
        return;
    };
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(err) => warn!(err = %err, pgid, "failed to kill process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child) {}

type StreamResult = Result<(Vec<u8>, usize)>;

fn spawn_reader<R: Read + Send + 'static>(stream: R, limit: usize) -> Receiver<StreamResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // The receiver is gone when the run already gave up on this stream.
        let _ = tx.send(read_stream_limited(stream, limit));
    });
    rx
}

/// Wait for a reader until `deadline`. `None` means the pipe is still open.
fn collect_output(
    rx: &Receiver<StreamResult>,
    deadline: Instant,
) -> Result<Option<(Vec<u8>, usize)>> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => result.map(Some),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
