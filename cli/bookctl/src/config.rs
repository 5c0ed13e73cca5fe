//! User configuration.
//!
//! Persistent defaults live in `config.json` under the platform config
//! directory. Flags and `BOOKCTL_*` environment variables override them.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "booking", "bookctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Full path of the config file.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Workload file used when `--workload` is not given.
    #[serde(default = "default_workload")]
    pub workload: PathBuf,

    /// Default output format (`table` or `json`).
    #[serde(default = "default_format")]
    pub format: String,

    /// Default log filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Proportionality tolerance for workloads without a `[booking]` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proportionality_tolerance: Option<f64>,
}

fn default_workload() -> PathBuf {
    PathBuf::from("workload.toml")
}

fn default_format() -> String {
    "table".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workload: default_workload(),
            format: default_format(),
            log_level: default_log_level(),
            proportionality_tolerance: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", path))
    }

    /// Parse config from JSON, filling unset fields with defaults.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}
