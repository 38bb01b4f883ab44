// SPDX-License-Identifier: PMPL-1.0-or-later
//! Configuration handling for contrastbot

use crate::contrast::{WcagLevel, MAX_RATIO, MIN_RATIO};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = ".contrastbot.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Contrast checking settings
    #[serde(default)]
    pub lint: LintConfig,

    /// Directory names skipped while scanning
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// File extensions treated as stylesheets
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lint: LintConfig::default(),
            exclude: default_exclude(),
            extensions: default_extensions(),
        }
    }
}

/// Contrast checking settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Conformance level whose threshold applies
    #[serde(default)]
    pub level: WcagLevel,

    /// Explicit minimum ratio, overriding `level`
    #[serde(default)]
    pub min_ratio: Option<f64>,
}

impl LintConfig {
    pub fn with_level(level: WcagLevel) -> Self {
        Self { level, min_ratio: None }
    }

    /// Minimum contrast ratio a rule must reach to pass
    pub fn threshold(&self) -> f64 {
        self.min_ratio.unwrap_or_else(|| self.level.min_ratio())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ratio) = self.min_ratio {
            if !(MIN_RATIO..=MAX_RATIO).contains(&ratio) {
                return Err(ConfigError::Invalid(format!(
                    "min_ratio must be between {} and {}, got {}",
                    MIN_RATIO, MAX_RATIO, ratio
                )));
            }
        }
        Ok(())
    }
}

fn default_exclude() -> Vec<String> {
    ["node_modules", ".git", "target", "dist", "build", "vendor", "coverage"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    vec!["css".to_string()]
}

impl Config {
    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.lint.validate()?;
        Ok(config)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}

/// Load configuration from `path`, falling back to defaults if it does not exist
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        debug!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = Config::from_toml(&content)?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
