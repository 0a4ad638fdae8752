//! Python harness.
//!
//! The candidate source and the tests are embedded as string literals and
//! executed inside the harness's own error handling, so a syntax error in the
//! submission is reported like any other runtime failure.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use minijinja::{Environment, context};

use crate::core::types::ExecutionRequest;
use crate::harness::{ENTRY_POINT, Harness};

const TEMPLATE_NAME: &str = "harness.py";
const HARNESS_TEMPLATE: &str = include_str!("templates/python.py.j2");

pub struct PythonHarness {
    interpreter: PathBuf,
    env: Environment<'static>,
}

impl PythonHarness {
    pub fn new(interpreter: impl Into<PathBuf>) -> Self {
        let mut env = Environment::new();
        env.add_template(TEMPLATE_NAME, HARNESS_TEMPLATE)
            .expect("python harness template should be valid");
        Self {
            interpreter: interpreter.into(),
            env,
        }
    }
}

/// Encode text as a double-quoted literal that Python parses back verbatim.
fn string_literal(text: &str) -> Result<String> {
    serde_json::to_string(text).context("encode string literal")
}

impl Harness for PythonHarness {
    fn language(&self) -> &'static str {
        "python"
    }

    fn file_name(&self) -> &'static str {
        "harness.py"
    }

    fn synthesize(&self, request: &ExecutionRequest) -> Result<String> {
        let tests_json = serde_json::to_string(request.tests()).context("encode tests")?;
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = template.render(context! {
            source => string_literal(request.source())?,
            tests => string_literal(&tests_json)?,
            entry_point => string_literal(ENTRY_POINT)?,
        })?;
        Ok(rendered)
    }

    fn command(&self, harness_path: &Path) -> Command {
        let mut cmd = Command::new(&self.interpreter);
        // -I: isolated mode (no user site, no PYTHON* env, no script dir on sys.path).
        // -B: no bytecode files in the scratch dir.
        cmd.arg("-I").arg("-B").arg(harness_path);
        cmd
    }
}
