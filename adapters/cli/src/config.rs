use std::{fs, path::Path};

use anyhow::{Context, Result};
use delve_core::GameConfig;
use log::info;

/// Loads and validates the session configuration.
///
/// Without a path the built-in defaults are used.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read configuration at {}", path.display()))?;
            let config = parse(&contents)
                .with_context(|| format!("failed to load configuration at {}", path.display()))?;
            info!("loaded configuration from {}", path.display());
            config
        }
        None => GameConfig::default(),
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn parse(contents: &str) -> Result<GameConfig> {
    toml::from_str(contents).context("failed to parse configuration toml contents")
}
