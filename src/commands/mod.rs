//! CLI command implementations

pub mod account;
pub mod run;
pub mod weights;

use anyhow::{Context, Result};

use crate::config::Config;

/// Load the config file if one was given, otherwise defaults + environment
pub(crate) fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(p) => Config::from_file(p).context(format!("Failed to load config from {}", p)),
        None => {
            let mut config = Config::default();
            config.apply_env();
            Ok(config)
        }
    }
}
