use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::env::LogFormat;
use crate::config::Config;

/// Diagnostics go to stderr so structured command output stays parseable.
/// `RUST_LOG` wins over `level`.
pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    Ok(())
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// Where the config was looked up, whether or not it existed
    pub path: PathBuf,
}

/// Read the YAML config at `config_path` (or the default location).
///
/// A missing file yields the defaults with paths left relative to the
/// working directory. A loaded file has its relative `rules_path` anchored
/// to the file's own directory.
pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let path = match config_path {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };

    if !fs::try_exists(&path).await.unwrap_or(false) {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            path,
        });
    }

    let content = fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let mut config: Config =
        serde_yaml::from_str(&content).context("Failed to parse config file")?;

    if let Some(base) = path.parent() {
        config.rules_path = anchor(base, &config.rules_path);
    }
    info!(
        path = %path.display(),
        rules = %config.rules_path.display(),
        "loaded configuration"
    );
    Ok(LoadedConfig { config, path })
}

fn anchor(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// `./config/config.yaml`, else `<config dir>/autoconsent/config.yaml`
fn default_config_path() -> Result<PathBuf> {
    let local_config = PathBuf::from("config/config.yaml");
    if local_config.exists() {
        return Ok(local_config);
    }
    let mut path = dirs::config_dir().context("Failed to get config directory")?;
    path.push("autoconsent");
    path.push("config.yaml");
    Ok(path)
}
