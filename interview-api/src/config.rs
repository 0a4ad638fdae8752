//! Server configuration (TOML).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use judge::io::config::JudgeConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind: String,
    pub port: u16,
    pub judge: JudgeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
            judge: JudgeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            return Err(anyhow!("bind must be a non-empty address"));
        }
        self.judge.validate().context("invalid [judge] section")
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ServerConfig::default()`.
pub fn load_config(path: &Path) -> Result<ServerConfig> {
    if !path.exists() {
        let cfg = ServerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ServerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
