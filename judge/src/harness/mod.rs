//! Harness synthesis strategies.
//!
//! The judge itself is language-agnostic. A [`Harness`] turns a request into a
//! runnable file and names the command that runs it; the file must honor the
//! payload contract in `schemas/harness_payload/v1.schema.json`.

pub mod python;

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::core::types::ExecutionRequest;
use crate::harness::python::PythonHarness;
use crate::io::config::JudgeConfig;

/// Name of the candidate function every harness invokes.
pub const ENTRY_POINT: &str = "solve";

/// Per-language harness contract.
pub trait Harness: Send + Sync {
    fn language(&self) -> &'static str;

    /// File name the synthesized harness is written under.
    fn file_name(&self) -> &'static str;

    /// Render a self-contained harness embedding the source and tests.
    fn synthesize(&self, request: &ExecutionRequest) -> Result<String>;

    /// Command that runs the harness at `harness_path`.
    fn command(&self, harness_path: &Path) -> Command;
}

/// Languages with a shipped harness, by canonical name.
pub fn languages() -> &'static [&'static str] {
    &["python"]
}

/// Resolve a harness for a language name or alias.
pub fn harness_for(language: &str, config: &JudgeConfig) -> Option<Box<dyn Harness>> {
    match language.trim().to_ascii_lowercase().as_str() {
        "python" | "python3" | "py" => Some(Box::new(PythonHarness::new(config.python.clone()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_python_aliases() {
        let config = JudgeConfig::default();
        for name in ["python", "Python3", " py "] {
            let harness = harness_for(name, &config).expect("python harness");
            assert_eq!(harness.language(), "python");
        }
    }

    #[test]
    fn unknown_language_has_no_harness() {
        assert!(harness_for("javascript", &JudgeConfig::default()).is_none());
    }

    #[test]
    fn every_listed_language_resolves() {
        let config = JudgeConfig::default();
        for language in languages() {
            assert!(harness_for(language, &config).is_some(), "{language}");
        }
    }
}
