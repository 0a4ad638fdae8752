//! Sandboxed code-execution judge for interview practice problems.
//!
//! A submission is a piece of candidate source plus a fixed list of test
//! cases. The judge synthesizes a harness around the source, runs it in a
//! fresh child process under a wall-clock timeout, and classifies what came
//! back. The crate keeps a strict split:
//!
//! - **[`core`]**: Pure, deterministic logic (data model, deep equality,
//!   payload classification). No I/O.
//! - **[`io`]**: Side-effecting operations (process spawning, scratch
//!   directories, configuration files).
//! - **[`harness`]**: Per-language harness synthesis strategies.
//!
//! [`judge`] ties the three together into a single call.

pub mod core;
pub mod exit_codes;
pub mod harness;
pub mod io;
pub mod judge;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::types::{ExecutionRequest, ExecutionResult, JudgeOutcome, TestCase};
pub use crate::judge::Judge;
