//! Command-line front end for the judge.
//!
//! Judges one solution file against a JSON test file and prints the outcome.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use judge::core::types::{ExecutionRequest, TestCase};
use judge::exit_codes;
use judge::harness::languages;
use judge::io::config::{JudgeConfig, load_config};
use judge::{Judge, logging};

#[derive(Parser)]
#[command(
    name = "judge",
    version,
    about = "Run candidate solutions against hidden test cases"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Judge a solution and print the outcome as JSON.
    Run {
        /// Candidate source file.
        #[arg(long)]
        source: PathBuf,
        /// JSON array of `{"input": [...], "output": ...}` test cases.
        #[arg(long)]
        tests: PathBuf,
        /// Harness language.
        #[arg(long, default_value = "python")]
        lang: String,
        /// Wall-clock budget for the whole run (overrides config).
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Judge config TOML; defaults apply when missing.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List languages with a harness.
    Languages,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            source,
            tests,
            lang,
            timeout_ms,
            config,
        } => cmd_run(&source, &tests, &lang, timeout_ms, config.as_deref()),
        Command::Languages => {
            for language in languages() {
                println!("{language}");
            }
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_run(
    source_path: &Path,
    tests_path: &Path,
    lang: &str,
    timeout_ms: Option<u64>,
    config_path: Option<&Path>,
) -> Result<i32> {
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => JudgeConfig::default(),
    };
    let timeout = timeout_ms.map_or_else(|| config.timeout(), Duration::from_millis);

    let source = fs::read_to_string(source_path)
        .with_context(|| format!("read {}", source_path.display()))?;
    let tests_raw = fs::read_to_string(tests_path)
        .with_context(|| format!("read {}", tests_path.display()))?;
    let tests: Vec<TestCase> = serde_json::from_str(&tests_raw)
        .with_context(|| format!("parse {}", tests_path.display()))?;
    let request = ExecutionRequest::new(source, tests)?;

    let judge = Judge::new(config);
    let harness = judge
        .harness(lang)
        .ok_or_else(|| anyhow!("unsupported language: {lang}"))?;
    let outcome = judge.judge(harness.as_ref(), &request, timeout)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&outcome).context("serialize outcome")?
    );
    Ok(if outcome.passed_all() {
        exit_codes::OK
    } else {
        exit_codes::FAILED
    })
}
