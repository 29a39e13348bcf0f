// src/core/storage_router.rs

//! # Storage-Location Router
//!
//! Each storage location (the primary root `A`, or a registered drive
//! `B`, `C`, ...) owns an independent ID namespace and its own cache file.
//! All cache files live in the primary root's data directory; the scan root
//! of a secondary location comes from the drive registry.

use crate::constants::{ID_CACHE_EXTENSION, ID_CACHE_PREFIX, PRIMARY_STORAGE};
use crate::core::paths::data_dir;
use crate::models::DriveRegistry;
use std::path::{Path, PathBuf};

/// Where the identifiers of one storage location are cached and scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoute {
    pub storage: char,
    pub cache_path: PathBuf,
    /// `None` for a secondary location missing from the drive registry.
    pub scan_root: Option<PathBuf>,
}

/// The storage location a code belongs to: its leading letter, if any.
pub fn storage_of(code: &str) -> char {
    match code.trim().chars().next() {
        Some(first) if !first.is_ascii_digit() => first.to_ascii_uppercase(),
        _ => PRIMARY_STORAGE,
    }
}

/// `IDPaths.json` for the primary location, `IDPaths<X>.json` otherwise.
pub fn cache_file_name(storage: char) -> String {
    let storage = storage.to_ascii_uppercase();
    if storage == PRIMARY_STORAGE {
        format!("{}.{}", ID_CACHE_PREFIX, ID_CACHE_EXTENSION)
    } else {
        format!("{}{}.{}", ID_CACHE_PREFIX, storage, ID_CACHE_EXTENSION)
    }
}

pub fn cache_path(root: &Path, storage: char) -> PathBuf {
    data_dir(root).join(cache_file_name(storage))
}

/// The storage letter encoded in a cache file name, or `None` if the name
/// is not an ID cache.
pub fn storage_from_cache_file(file_name: &str) -> Option<char> {
    let stem = file_name
        .strip_prefix(ID_CACHE_PREFIX)?
        .strip_suffix(ID_CACHE_EXTENSION)?
        .strip_suffix('.')?;

    let mut chars = stem.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Some(PRIMARY_STORAGE),
        (Some(letter), None) if letter.is_ascii_alphabetic() => Some(letter.to_ascii_uppercase()),
        _ => None,
    }
}

/// Resolves the cache file and scan root of `storage`.
pub fn route(root: &Path, storage: char, registry: &DriveRegistry) -> StorageRoute {
    let storage = storage.to_ascii_uppercase();
    let scan_root = if storage == PRIMARY_STORAGE {
        Some(root.to_path_buf())
    } else {
        registry.get(storage).map(|drive| PathBuf::from(&drive.path))
    };

    StorageRoute {
        storage,
        cache_path: cache_path(root, storage),
        scan_root,
    }
}
