//! # Config Loader
//!
//! Reads the user's `config.toml` and resolves the root of the primary
//! storage location. The `GLASS_ROOT` environment variable takes precedence
//! over the configured `root_path`.

use crate::core::paths::{self, PathError};
use crate::models::GlassConfig;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Overrides `root_path` from the config file.
pub const ROOT_ENV: &str = "GLASS_ROOT";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No configuration file at '{0}'. Create it with at least `root_path = \"...\"`.")]
    NotFound(String),
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration in '{path}': {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
}

/// A parsed configuration together with its resolved root.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: GlassConfig,
    /// Absolute root of the primary storage location.
    pub root: PathBuf,
    /// The file the configuration came from.
    pub source: PathBuf,
}

/// Loads the configuration from the user config directory.
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
    let path = paths::get_config_file_path()?;
    load_config_from(&path, std::env::var(ROOT_ENV).ok())
}

/// Loads the configuration at `path`. `root_override`, when set, replaces the
/// configured `root_path`.
pub fn load_config_from(path: &Path, root_override: Option<String>) -> Result<LoadedConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::NotFound(path.display().to_string())
        } else {
            ConfigError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    })?;

    let mut config: GlassConfig = toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(root) = root_override.filter(|r| !r.trim().is_empty()) {
        log::debug!("{} overrides root_path with '{}'", ROOT_ENV, root);
        config.root_path = root;
    }

    let root = paths::resolve_configured_path(&config.root_path)?;
    log::debug!("Primary storage root is '{}'", root.display());

    Ok(LoadedConfig {
        config,
        root,
        source: path.to_path_buf(),
    })
}
