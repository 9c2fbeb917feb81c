// Project-wide constants
//
// Centralised here so file names and environment variables have one
// source of truth. Import via `use crate::config::constants::*;`.

/// Directory under $HOME holding the config file
pub const CONFIG_DIR_NAME: &str = ".fingerspell";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Overrides `[model] path`
pub const ENV_MODEL_PATH: &str = "FINGERSPELL_MODEL";

/// Overrides `[classifier] confidence_threshold`
pub const ENV_CONFIDENCE_THRESHOLD: &str = "FINGERSPELL_THRESHOLD";
