//! Engine configuration
//!
//! Loaded from a YAML file; every field has a default so an empty (or
//! missing) file yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Tuning engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Push each committed value to the bound target immediately.
    #[serde(default = "default_live_apply")]
    pub live_apply: bool,
    /// Quiet period after the last control release before interactive
    /// edits commit, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Per-tick increment for held float controls.
    #[serde(default = "default_step")]
    pub step: f64,
    /// Directory for snapshots and presets. Defaults to a per-user
    /// data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: EngineConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Resolved data directory: configured value, or the per-user
    /// default (`~/.local/share/livetune` on Linux).
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("livetune")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            live_apply: default_live_apply(),
            debounce_ms: default_debounce_ms(),
            step: default_step(),
            data_dir: None,
        }
    }
}

// Default value functions
fn default_live_apply() -> bool { true }
fn default_debounce_ms() -> u64 { 200 }
fn default_step() -> f64 { 0.01 }
