// src/state.rs

//! The explicit application state threaded through every command: the
//! configuration, the drive registry (journaled so it is only written back
//! when a command actually changed it), and the ID caches loaded so far.

use crate::constants::PRIMARY_STORAGE;
use crate::core::background::{self, BackgroundError, BackgroundRequest};
use crate::core::cache_store::{self, CacheError, IdCache};
use crate::core::config_loader::LoadedConfig;
use crate::core::drive_manager::{self, DriveError};
use crate::core::identifier::{self, Identifier};
use crate::core::scanner::ExclusionSet;
use crate::core::storage_router::{self, StorageRoute};
use crate::core::clock;
use crate::models::{DriveRegistry, GlassConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Background(#[from] BackgroundError),
    #[error("Storage location {0} has no ID cache and is not a registered drive.")]
    UnknownStorage(char),
    #[error("The ID {0} does not exist in the file system.")]
    IdNotFound(String),
}

/// Holds the drive registry, and once it has been mutated, a snapshot of
/// the registry as loaded.
#[derive(Debug)]
enum RegistryState {
    Pristine(DriveRegistry),
    Dirty {
        original: DriveRegistry,
        current: DriveRegistry,
    },
}

/// The application state of one command invocation.
#[derive(Debug)]
pub struct AppState {
    pub root: PathBuf,
    pub config: GlassConfig,
    /// The command line, recorded in run logs.
    pub command_line: String,
    drives: RegistryState,
    caches: HashMap<char, IdCache>,
}

impl AppState {
    /// Builds the state from a loaded configuration, reading the drive
    /// registry from disk.
    pub fn load(loaded: LoadedConfig, command_line: String) -> Result<Self, DriveError> {
        let registry = drive_manager::load_drives(&loaded.root)?;
        Ok(Self::new(loaded.root, loaded.config, registry, command_line))
    }

    pub fn new(
        root: PathBuf,
        config: GlassConfig,
        registry: DriveRegistry,
        command_line: String,
    ) -> Self {
        Self {
            root,
            config,
            command_line,
            drives: RegistryState::Pristine(registry),
            caches: HashMap::new(),
        }
    }

    /// Read-only access to the drive registry.
    pub fn drives(&self) -> &DriveRegistry {
        match &self.drives {
            RegistryState::Pristine(registry) => registry,
            RegistryState::Dirty { current, .. } => current,
        }
    }

    /// Mutable access to the drive registry. The first call snapshots the
    /// registry so `needs_saving` can tell whether anything changed.
    pub fn drives_mut(&mut self) -> &mut DriveRegistry {
        if let RegistryState::Pristine(registry) = &self.drives {
            self.drives = RegistryState::Dirty {
                original: registry.clone(),
                current: registry.clone(),
            };
        }
        match &mut self.drives {
            RegistryState::Pristine(registry) => registry,
            RegistryState::Dirty { current, .. } => current,
        }
    }

    pub fn needs_saving(&self) -> bool {
        match &self.drives {
            RegistryState::Pristine(_) => false,
            RegistryState::Dirty { original, current } => original != current,
        }
    }

    /// Writes the drive registry back if a command changed it.
    pub fn persist(&mut self) -> Result<(), DriveError> {
        if !self.needs_saving() {
            return Ok(());
        }
        let root = self.root.clone();
        drive_manager::save_drives(&root, self.drives_mut())?;
        let saved = self.drives().clone();
        self.drives = RegistryState::Pristine(saved);
        log::debug!("Saved drive registry");
        Ok(())
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::new(&self.config.excluded_folders)
    }

    pub fn route(&self, storage: char) -> StorageRoute {
        storage_router::route(&self.root, storage, self.drives())
    }

    /// Drops the in-memory cache of `storage`, forcing a reload.
    pub fn invalidate(&mut self, storage: char) {
        self.caches.remove(&storage.to_ascii_uppercase());
    }

    /// Rescans `storage`, rewrites its cache and keeps the fresh result in
    /// memory. Returns the number of valid identifiers found.
    pub fn rescan(&mut self, storage: char) -> Result<usize, BackgroundError> {
        let route = self.route(storage);
        let exclusions = self.exclusions();
        let request = BackgroundRequest {
            root: &self.root,
            route: &route,
            exclusions: &exclusions,
            registry: self.drives(),
            command: &self.command_line,
        };
        let ids = background::run_background_tasks(&request)?;
        let count = ids.len();
        self.caches
            .insert(route.storage, IdCache::from_ids(&ids, clock::now_utc_seconds()));
        Ok(count)
    }

    /// The cache of `storage`, loading it from disk on first use.
    ///
    /// A missing cache file is `Ok(None)` when the location can be scanned,
    /// and `CacheNotFound` otherwise.
    fn cached(&mut self, storage: char) -> Result<Option<&IdCache>, LookupError> {
        let storage = storage.to_ascii_uppercase();
        if !self.caches.contains_key(&storage) {
            let route = self.route(storage);
            match cache_store::import_ids(&route.cache_path, storage) {
                Ok(cache) => {
                    self.caches.insert(storage, cache);
                }
                Err(CacheError::CacheNotFound { .. }) if route.scan_root.is_some() => {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(self.caches.get(&storage))
    }

    /// The full cache of `storage`, scanning the location if no cache exists
    /// yet.
    pub fn cache(&mut self, storage: char) -> Result<&IdCache, LookupError> {
        let storage = storage.to_ascii_uppercase();
        if self.cached(storage)?.is_none() {
            self.rescan(storage)?;
        }
        self.caches
            .get(&storage)
            .ok_or(LookupError::UnknownStorage(storage))
    }

    /// Finds an identifier by code: look it up in the cache, and on a miss
    /// rescan its storage location once and look again.
    pub fn find_id(&mut self, code: &str) -> Result<Identifier, LookupError> {
        let code = identifier::normalize_code(code);
        let code = code.as_str();
        let storage = storage_router::storage_of(code);

        if let Some(id) = self.lookup(storage, code)? {
            return Ok(id);
        }
        log::info!("ID {} not in the cache; rescanning storage {}", code, storage);
        self.rescan(storage)?;
        self.lookup(storage, code)?
            .ok_or_else(|| LookupError::IdNotFound(code.to_string()))
    }

    fn lookup(&mut self, storage: char, code: &str) -> Result<Option<Identifier>, LookupError> {
        let Some(cache) = self.cached(storage)? else {
            return Ok(None);
        };
        let found = cache.get(code).or_else(|| {
            // `A21.01` names the same folder as `21.01`.
            code.strip_prefix(PRIMARY_STORAGE)
                .filter(|_| storage == PRIMARY_STORAGE)
                .and_then(|bare| cache.get(bare))
        });
        Ok(found.cloned())
    }

    /// The directory `code` resolves to.
    pub fn path_of(&mut self, code: &str) -> Result<PathBuf, LookupError> {
        self.find_id(code).map(|id| id.fs_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn state_for(root: &Path) -> AppState {
        AppState::new(
            root.to_path_buf(),
            GlassConfig::new(root.display().to_string()),
            DriveRegistry::default(),
            "glass test".to_string(),
        )
    }

    #[test]
    fn test_find_id_scans_when_no_cache_exists() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20 - Work/21 - Clients")).unwrap();
        let mut state = state_for(temp.path());

        let id = state.find_id("21").unwrap();
        assert_eq!(id.descriptor, "Clients");
        assert!(storage_router::cache_path(temp.path(), 'A').is_file());
    }

    #[test]
    fn test_find_id_rescans_once_on_a_stale_cache() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20 - Work")).unwrap();
        let mut state = state_for(temp.path());
        state.find_id("20").unwrap();

        // Created after the cache was built.
        fs::create_dir_all(temp.path().join("30 - Home")).unwrap();
        let mut fresh = state_for(temp.path());
        assert_eq!(fresh.find_id("30").unwrap().descriptor, "Home");
    }

    #[test]
    fn test_find_id_fails_after_one_retry() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20 - Work")).unwrap();
        let mut state = state_for(temp.path());

        let err = state.find_id("40").unwrap_err();
        assert!(matches!(err, LookupError::IdNotFound(code) if code == "40"));
    }

    #[test]
    fn test_primary_letter_prefix_is_optional() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20 - Work")).unwrap();
        let mut state = state_for(temp.path());
        assert_eq!(state.find_id("A20").unwrap().raw_text, "20");
    }

    #[test]
    fn test_unregistered_secondary_storage_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut state = state_for(temp.path());
        let err = state.find_id("B21").unwrap_err();
        assert!(matches!(
            err,
            LookupError::Cache(CacheError::CacheNotFound { storage: 'B', .. })
        ));
    }

    #[test]
    fn test_registered_secondary_storage_is_scanned() {
        let primary = TempDir::new().unwrap();
        let drive = TempDir::new().unwrap();
        fs::create_dir_all(drive.path().join("B20 - Work")).unwrap();

        let mut state = state_for(primary.path());
        drive_manager::add_drive(
            state.drives_mut(),
            "B",
            "Archive",
            &drive.path().display().to_string(),
        )
        .unwrap();

        let id = state.find_id("B20").unwrap();
        assert_eq!(id.storage_location, 'B');
        assert!(storage_router::cache_path(primary.path(), 'B').is_file());

        // A lowercase storage letter names the same ID.
        assert_eq!(state.find_id("b20").unwrap().raw_text, "B20");
    }

    #[test]
    fn test_registry_is_saved_only_when_changed() {
        let temp = TempDir::new().unwrap();
        let mut state = state_for(temp.path());
        assert!(!state.needs_saving());

        // Mutable access alone is not a change.
        let _ = state.drives_mut();
        assert!(!state.needs_saving());
        state.persist().unwrap();
        assert!(!drive_manager::drives_file_path(temp.path()).exists());

        drive_manager::add_drive(state.drives_mut(), "C", "Cloud", "/cloud").unwrap();
        assert!(state.needs_saving());
        state.persist().unwrap();
        assert!(!state.needs_saving());
        assert_eq!(
            drive_manager::load_drives(temp.path()).unwrap().label_of('C'),
            Some("Cloud")
        );
    }

    #[test]
    fn test_cache_is_reused_until_invalidated() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("20 - Work")).unwrap();
        let mut state = state_for(temp.path());
        assert_eq!(state.cache('A').unwrap().len(), 1);

        fs::create_dir_all(temp.path().join("30 - Home")).unwrap();
        assert_eq!(state.cache('A').unwrap().len(), 1);
        state.rescan('A').unwrap();
        state.invalidate('A');
        assert_eq!(state.cache('A').unwrap().len(), 2);
    }
}
