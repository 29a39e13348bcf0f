// src/core/paths.rs

use crate::constants::{BACKUPS_DIR, CONFIG_FILENAME, DATA_DIR, GLASS_DIR, LOGS_DIR};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref GLASS_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Overrides the user configuration directory.
pub const CONFIG_DIR_ENV: &str = "GLASS_CONFIG_DIR";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not expand path '{template}': {reason}")]
    Expansion { template: String, reason: String },
    #[error("The path '{path}' does not exist or cannot be read: {source}")]
    Unresolvable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the glass user configuration directory (`~/.config/glass`, or
/// `$GLASS_CONFIG_DIR`), creating it if needed.
///
/// The first call computes the path; later calls return the memoized value.
pub fn get_glass_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = GLASS_CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join("glass"),
    };

    ensure_dir(&config_path)?;
    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the user's `config.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_glass_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// `<root>/.glass`
pub fn glass_dir(root: &Path) -> PathBuf {
    root.join(GLASS_DIR)
}

/// `<root>/.glass/data`
pub fn data_dir(root: &Path) -> PathBuf {
    glass_dir(root).join(DATA_DIR)
}

/// `<root>/.glass/logs`
pub fn logs_dir(root: &Path) -> PathBuf {
    glass_dir(root).join(LOGS_DIR)
}

/// `<root>/.glass/backups`
pub fn backups_dir(root: &Path) -> PathBuf {
    glass_dir(root).join(BACKUPS_DIR)
}

/// Creates `dir` and its parents if they do not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), PathError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| PathError::DirCreation {
        path: dir.display().to_string(),
        source,
    })
}

/// Expands `~` and environment variables in a configured path and resolves
/// it to an absolute, non-UNC path. The path must exist.
pub fn resolve_configured_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    let expanded = PathBuf::from(expanded.into_owned());
    dunce::canonicalize(&expanded).map_err(|source| PathError::Unresolvable {
        path: expanded.display().to_string(),
        source,
    })
}

/// The canonical string form of a path stored in identifiers and caches:
/// every separator is a forward slash.
pub fn canonical_path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_state_dirs_live_under_glass_dir() {
        let root = Path::new("/srv/files");
        assert_eq!(data_dir(root), Path::new("/srv/files/.glass/data"));
        assert_eq!(logs_dir(root), Path::new("/srv/files/.glass/logs"));
        assert_eq!(backups_dir(root), Path::new("/srv/files/.glass/backups"));
    }

    #[test]
    fn test_canonical_path_string_uses_forward_slashes() {
        let path = Path::new(r"C:\Users\me\10 - Admin");
        assert_eq!(canonical_path_string(path), "C:/Users/me/10 - Admin");
    }

    #[test]
    fn test_ensure_dir_creates_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // A second call is a no-op.
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_resolve_configured_path_requires_existing_dir() {
        let temp = TempDir::new().unwrap();
        let resolved = resolve_configured_path(&temp.path().display().to_string()).unwrap();
        assert!(resolved.is_absolute());

        let missing = temp.path().join("missing");
        let result = resolve_configured_path(&missing.display().to_string());
        assert!(matches!(result, Err(PathError::Unresolvable { .. })));
    }
}
