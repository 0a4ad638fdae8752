//! Deterministic, pure logic shared by the judge.
//!
//! Core modules must be free of process and filesystem side effects. They
//! operate on in-memory values and return deterministic outputs suitable for
//! tests.

pub mod equality;
pub mod payload;
pub mod report;
pub mod types;
