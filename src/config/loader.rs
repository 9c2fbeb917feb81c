// Configuration loader
// Reads ~/.fingerspell/config.toml (or an explicit path) and applies
// environment overrides

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use super::settings::Config;

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, a missing default file just
/// means built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Configuration file not found: {}", path.display());
            }
            read_config_file(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    debug!("Reading config from {}", path.display());
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    Config::from_toml(&contents).with_context(|| format!("In {}", path.display()))
}
