// src/constants.rs

/// The hidden directory under a root that holds all glass state.
pub const GLASS_DIR: &str = ".glass";

/// Sub-directory of [`GLASS_DIR`] holding the ID caches and drive registry.
pub const DATA_DIR: &str = "data";

/// Sub-directory of [`GLASS_DIR`] holding run logs.
pub const LOGS_DIR: &str = "logs";

/// Sub-directory of [`GLASS_DIR`] holding dated backup fingerprints.
pub const BACKUPS_DIR: &str = "backups";

/// Prefix of every ID cache file. The primary location has no suffix,
/// other locations append their letter (`IDPathsB.json`).
pub const ID_CACHE_PREFIX: &str = "IDPaths";

/// Extension of the ID cache files.
pub const ID_CACHE_EXTENSION: &str = "json";

/// The drive registry file (inside `.glass/data/`).
pub const DRIVES_FILENAME: &str = "drives.json";

/// The background task log (inside `.glass/logs/`).
pub const BACKGROUND_LOG_FILENAME: &str = "background.txt";

/// The fingerprint written at the root by `backup encode`.
pub const IDENTIFIER_FILENAME: &str = "identifier.json";

/// The user configuration file (in `~/.config/glass/`).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Extension of stand-in files.
pub const STANDIN_EXTENSION: &str = "glass";

/// Letter of the primary storage location.
pub const PRIMARY_STORAGE: char = 'A';

/// Separator between an ID and its title in a folder name.
pub const TITLE_SEPARATOR: &str = " - ";

/// Crate version, written into every generated file.
pub const GLASS_VERSION: &str = env!("CARGO_PKG_VERSION");
