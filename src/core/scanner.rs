// src/core/scanner.rs

//! # Hierarchy Scanner
//!
//! Walks a root directory one level at a time and turns every `"<code> -
//! <title>"` folder into an [`Identifier`]. Malformed folders never abort the
//! scan: they are collected in [`ScanResult::invalid`].

use crate::core::identifier::{self, Identifier};
use crate::core::paths::canonical_path_string;
use crate::models::IdLevel;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Descriptor of folders whose name does not split into one code and one
/// title at a `" - "` separator.
pub const NO_ID_DESCRIPTOR: &str = "Invalid Folder Name, no discernible ID";

/// Project children named by their two-character revision suffix (`B2`).
const REVISION_SUFFIX_LEN: usize = 2;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("The scan root '{path}' cannot be read: {source}")]
    RootInaccessible {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("The scan root '{0}' is not a directory.")]
    RootNotADirectory(String),
}

/// Folder names skipped at every depth, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, folder_name: &str) -> bool {
        self.names.contains(&folder_name.to_lowercase())
    }
}

/// The outcome of one scan.
#[derive(Debug, Default, Clone)]
pub struct ScanResult {
    pub valid: Vec<Identifier>,
    pub invalid: Vec<Identifier>,
}

impl ScanResult {
    fn push(&mut self, id: Identifier) {
        if id.is_valid() {
            self.valid.push(id);
        } else {
            self.invalid.push(id);
        }
    }

    /// Folders at `level` whose children are scanned in the next pass.
    ///
    /// Subfolders are explored even when they failed validation: a folder
    /// that holds projects is a subfolder whatever its own name says.
    fn parents_at(&self, level: IdLevel) -> Vec<Identifier> {
        let mut parents: Vec<Identifier> = self
            .valid
            .iter()
            .filter(|id| id.level == level)
            .cloned()
            .collect();
        if level == IdLevel::Subfolder {
            parents.extend(
                self.invalid
                    .iter()
                    .filter(|id| id.claimed_level() == Some(IdLevel::Subfolder))
                    .cloned(),
            );
        }
        parents
    }
}

/// Scans the whole hierarchy below `root`.
///
/// The root's children are read first; then each level, broadest first,
/// contributes the folders whose children are read next.
///
/// # Errors
/// Only an unreadable root is fatal. Unreadable entries below it are logged
/// and skipped.
pub fn scan_hierarchy(root: &Path, exclusions: &ExclusionSet) -> Result<ScanResult, ScanError> {
    let metadata = std::fs::metadata(root).map_err(|source| ScanError::RootInaccessible {
        path: root.display().to_string(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ScanError::RootNotADirectory(root.display().to_string()));
    }

    let mut result = ScanResult::default();
    for (path, folder_name) in child_folders(root, exclusions) {
        result.push(identify_folder(&path, &folder_name, None));
    }

    for level in IdLevel::HIERARCHY {
        let parents = result.parents_at(level);
        debug!("Scanning children of {} {} folders", parents.len(), level);
        for parent in parents {
            for (path, folder_name) in child_folders(&parent.fs_path(), exclusions) {
                result.push(identify_folder(&path, &folder_name, Some(&parent)));
            }
        }
    }

    debug!(
        "Scan of '{}' found {} valid and {} invalid IDs",
        root.display(),
        result.valid.len(),
        result.invalid.len()
    );
    Ok(result)
}

/// Immediate child directories of `dir`, sorted by name, minus exclusions.
fn child_folders(dir: &Path, exclusions: &ExclusionSet) -> Vec<(PathBuf, String)> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    let mut folders = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under '{}': {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let folder_name = entry.file_name().to_string_lossy().into_owned();
        if exclusions.contains(&folder_name) {
            debug!("Excluded folder '{}'", entry.path().display());
            continue;
        }
        folders.push((entry.into_path(), folder_name));
    }
    folders
}

/// Classifies one folder found below `parent` (`None` at the root).
fn identify_folder(path: &Path, folder_name: &str, parent: Option<&Identifier>) -> Identifier {
    let path_text = canonical_path_string(path);
    let Some((code, title)) = identifier::split_folder_name(folder_name) else {
        return Identifier::unparsed(&path_text, NO_ID_DESCRIPTOR);
    };

    let code = match parent {
        Some(project)
            if project.level == IdLevel::Project
                && code.chars().count() == REVISION_SUFFIX_LEN =>
        {
            format!("{}{}", project.raw_text, code)
        }
        _ => code.to_string(),
    };
    Identifier::classify(&code, &path_text, title)
}
