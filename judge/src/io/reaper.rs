//! Cleanup of processes a harness leaves behind after its group is killed.
//!
//! Killing the harness process group misses descendants that moved to their
//! own session. On Linux the judge marks itself a child subreaper, so such
//! descendants are re-parented to the judge once their parent dies, and
//! [`sweep_orphans`] kills and reaps them.
//!
//! Harness leaders are spawned and registered under the same lock the sweep
//! takes, so a sweep never mistakes a fresh leader for an orphan.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Pids of harness leaders that are currently running.
static LEADERS: Mutex<BTreeSet<u32>> = Mutex::new(BTreeSet::new());

const SWEEP_BUDGET: Duration = Duration::from_secs(1);
const SWEEP_POLL: Duration = Duration::from_millis(10);

pub(crate) fn leaders() -> MutexGuard<'static, BTreeSet<u32>> {
    LEADERS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Make this process the reaper of orphaned descendants. Idempotent.
#[cfg(target_os = "linux")]
pub(crate) fn become_subreaper() {
    use std::sync::OnceLock;

    static ENABLED: OnceLock<()> = OnceLock::new();
    ENABLED.get_or_init(|| {
        if let Err(err) = nix::sys::prctl::set_child_subreaper(true) {
            tracing::warn!(
                err = %err,
                "cannot become child subreaper; detached descendants may survive"
            );
        }
    });
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn become_subreaper() {}

/// Unregister `leader` and kill every orphan adopted by this process.
///
/// Returns the number of orphans killed.
pub(crate) fn sweep_orphans(leader: u32) -> usize {
    let mut leaders = leaders();
    leaders.remove(&leader);
    sweep_locked(&leaders)
}

#[cfg(target_os = "linux")]
fn sweep_locked(leaders: &BTreeSet<u32>) -> usize {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill, killpg};
    use nix::sys::wait::{WaitPidFlag, waitpid};
    use nix::unistd::{Pid, getpgrp};

    let own_group = u32::try_from(getpgrp().as_raw()).unwrap_or(0);
    let deadline = Instant::now() + SWEEP_BUDGET;
    let mut killed = BTreeSet::new();

    loop {
        let orphans = proc::adopted_children(std::process::id(), own_group, leaders);
        if orphans.is_empty() || Instant::now() >= deadline {
            if !orphans.is_empty() {
                tracing::warn!(remaining = orphans.len(), "orphan sweep ran out of time");
            }
            break;
        }
        for orphan in orphans {
            let Ok(raw) = i32::try_from(orphan.pid) else {
                continue;
            };
            let pid = Pid::from_raw(raw);
            // A group led by a live harness belongs to another run; kill only the orphan.
            if !leaders.contains(&orphan.pgrp) {
                if let Ok(pgrp) = i32::try_from(orphan.pgrp) {
                    match killpg(Pid::from_raw(pgrp), Signal::SIGKILL) {
                        Ok(()) | Err(Errno::ESRCH) => {}
                        Err(err) => tracing::warn!(err = %err, pgrp, "failed to kill orphan group"),
                    }
                }
            }
            match kill(pid, Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(err) => tracing::warn!(err = %err, pid = raw, "failed to kill orphan"),
            }
            let _ = waitpid(pid, Some(WaitPidFlag::WNOHANG));
            killed.insert(orphan.pid);
        }
        std::thread::sleep(SWEEP_POLL);
    }

    if !killed.is_empty() {
        tracing::info!(count = killed.len(), "killed orphaned harness descendants");
    }
    killed.len()
}

#[cfg(not(target_os = "linux"))]
fn sweep_locked(_leaders: &BTreeSet<u32>) -> usize {
    0
}

#[cfg(target_os = "linux")]
mod proc {
    use std::collections::BTreeSet;
    use std::fs;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(super) struct ProcEntry {
        pub pid: u32,
        pub ppid: u32,
        pub pgrp: u32,
    }

    /// Parse `/proc/<pid>/stat`. The command name may contain spaces and parens.
    pub(super) fn parse_stat(pid: u32, stat: &str) -> Option<ProcEntry> {
        let rest = &stat[stat.rfind(')')? + 1..];
        let mut fields = rest.split_whitespace();
        let _state = fields.next()?;
        let ppid = fields.next()?.parse().ok()?;
        let pgrp = fields.next()?.parse().ok()?;
        Some(ProcEntry { pid, ppid, pgrp })
    }

    /// Children of `parent` that it did not spawn as a harness leader and that
    /// left its process group.
    pub(super) fn adopted_children(
        parent: u32,
        own_group: u32,
        leaders: &BTreeSet<u32>,
    ) -> Vec<ProcEntry> {
        let Ok(entries) = fs::read_dir("/proc") else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str()?.parse::<u32>().ok())
            .filter_map(|pid| {
                let stat = fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
                parse_stat(pid, &stat)
            })
            .filter(|p| p.ppid == parent && p.pgrp != own_group && !leaders.contains(&p.pid))
            .collect()
    }

}
