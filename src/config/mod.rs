mod types;

pub use types::*;

use crate::Result;
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub async fn load() -> Result<Config> {
    load_with(env::var("CONFIG_PATH").ok(), env::var("PORT").ok()).await
}

/// `config_path` and `port` take the place of `CONFIG_PATH` and `PORT`.
pub async fn load_with(config_path: Option<String>, port: Option<String>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => load_from(&path).await?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_from(DEFAULT_CONFIG_PATH).await?,
        None => {
            debug!("No configuration file found, using defaults");
            Config::default()
        }
    };

    if let Some(port) = port {
        config.server.port = port
            .parse()
            .map_err(|_| crate::Error::config(format!("Invalid PORT value: '{}'", port)))?;
    }

    Ok(config)
}

pub async fn load_from(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}
