//! I/O helpers for judge runs.

pub mod config;
pub mod process;
pub(crate) mod reaper;
pub mod scratch;
