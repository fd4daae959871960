//! Sync configuration loaded from environment variables
//!
//! Wraps the shared [`CommonConfig`] and adds the accounts file location and
//! the player control preferences.

use std::path::PathBuf;

use anyhow::{Context, Result};
use spotify_modal_config::{get_env_or_default, parse_env, CommonConfig};

const DEFAULT_ACCOUNTS_FILE: &str = "accounts.json";
const DEFAULT_RESET_THRESHOLD: f64 = 0.15;

/// Player control preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// "Previous" restarts the current track once enough of it has played
    pub skip_previous_resets_progress: bool,

    /// Fraction of the track (0..=1) after which "previous" restarts it
    pub skip_previous_reset_threshold: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            skip_previous_resets_progress: true,
            skip_previous_reset_threshold: DEFAULT_RESET_THRESHOLD,
        }
    }
}

impl ControlsConfig {
    /// Load control preferences from environment variables
    pub fn from_env() -> Result<Self> {
        let skip_previous_resets_progress = parse_env("SKIP_PREVIOUS_RESETS_PROGRESS", true)
            .context("Invalid SKIP_PREVIOUS_RESETS_PROGRESS value")?;

        let skip_previous_reset_threshold: f64 =
            parse_env("SKIP_PREVIOUS_RESET_THRESHOLD", DEFAULT_RESET_THRESHOLD)
                .context("Invalid SKIP_PREVIOUS_RESET_THRESHOLD value")?;

        if !(0.0..=1.0).contains(&skip_previous_reset_threshold) {
            anyhow::bail!(
                "SKIP_PREVIOUS_RESET_THRESHOLD must be between 0 and 1, got {}",
                skip_previous_reset_threshold
            );
        }

        Ok(Self {
            skip_previous_resets_progress,
            skip_previous_reset_threshold,
        })
    }
}

/// Sync engine configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with other components
    pub common: CommonConfig,

    /// JSON file listing the connected accounts
    pub accounts_file: PathBuf,

    pub controls: ControlsConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

        Ok(Self {
            common,
            accounts_file: PathBuf::from(get_env_or_default(
                "SPOTIFY_MODAL_ACCOUNTS",
                DEFAULT_ACCOUNTS_FILE,
            )),
            controls: ControlsConfig::from_env()?,
        })
    }
}
