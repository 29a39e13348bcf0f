// src/core/background.rs

//! # Background Tasks
//!
//! The synchronous rescan that rebuilds the ID cache of one storage
//! location: compare the drive registry against the cache files on disk,
//! scan the hierarchy, aggregate revisions, report duplicates and invalid
//! folders, and export the cache.
//!
//! Every run truncates and rewrites `.glass/logs/background.txt`, a
//! plain-text account of the most recent scan. Lines are mirrored to the
//! `log` facade.

use crate::constants::{BACKGROUND_LOG_FILENAME, GLASS_VERSION};
use crate::core::cache_store::{self, CacheError};
use crate::core::drive_manager::{self, DriveError};
use crate::core::identifier::Identifier;
use crate::core::paths::{self, PathError};
use crate::core::revisions::assign_revisions;
use crate::core::scanner::{self, ExclusionSet, ScanError};
use crate::core::storage_router::StorageRoute;
use crate::core::clock;
use crate::models::DriveRegistry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackgroundError {
    #[error("Could not write the run log '{path}': {source}")]
    Log {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Drive comparison failed: {0}")]
    Drive(#[from] DriveError),
    #[error("File system scan failed: {0}")]
    Scan(#[from] ScanError),
    #[error("Could not write the ID cache: {0}")]
    Cache(#[from] CacheError),
    #[error("Storage location {0} is not in the drive registry.")]
    UnregisteredStorage(char),
}

/// Everything one rescan needs.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundRequest<'a> {
    /// Root of the primary storage location (holds `.glass/`).
    pub root: &'a Path,
    pub route: &'a StorageRoute,
    pub exclusions: &'a ExclusionSet,
    pub registry: &'a DriveRegistry,
    /// The command line that triggered the run, for the log header.
    pub command: &'a str,
}

/// Indentation of a run log line: sections, their entries, and per-item
/// details.
#[derive(Debug, Clone, Copy)]
enum Depth {
    Section = 1,
    Entry = 3,
    Detail = 5,
}

/// The plain-text run log.
#[derive(Debug)]
pub struct RunLog<W: Write> {
    out: W,
    label: String,
}

impl RunLog<BufWriter<File>> {
    /// Truncates (or creates) the log file at `path`.
    pub fn create(path: &Path) -> Result<Self, BackgroundError> {
        let file = File::create(path).map_err(|source| BackgroundError::Log {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file), path.display().to_string()))
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(out: W, label: impl Into<String>) -> Self {
        Self {
            out,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, depth: Depth, level: &str, message: &str) -> Result<(), BackgroundError> {
        writeln!(
            self.out,
            "{}{}{} {}",
            clock::local_timestamp(),
            " ".repeat(depth as usize),
            level,
            message
        )
        .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> BackgroundError {
        BackgroundError::Log {
            path: self.label.clone(),
            source,
        }
    }

    fn begin(&mut self, section: &str) -> Result<(), BackgroundError> {
        log::debug!("BEGIN {}", section);
        self.line(Depth::Section, "BEGIN", section)
    }

    fn end(&mut self, section: &str) -> Result<(), BackgroundError> {
        log::debug!("END {}", section);
        self.line(Depth::Section, "END", section)
    }

    fn info(&mut self, depth: Depth, message: &str) -> Result<(), BackgroundError> {
        log::info!("{}", message);
        self.line(depth, "INFO", message)
    }

    fn warn(&mut self, depth: Depth, message: &str) -> Result<(), BackgroundError> {
        log::warn!("{}", message);
        self.line(depth, "WARN", message)
    }

    /// Records a failed step: its name, then the cause.
    fn error(&mut self, step: &str, cause: &dyn std::fmt::Display) -> Result<(), BackgroundError> {
        log::error!("{} failed: {}", step, cause);
        self.line(Depth::Section, "ERROR", &format!("in {}", step))?;
        self.line(Depth::Detail, "ERROR", &cause.to_string())
    }

    fn flush(&mut self) -> Result<(), BackgroundError> {
        self.out.flush().map_err(|source| self.io_error(source))
    }
}

/// `<root>/.glass/logs/background.txt`
pub fn log_file_path(root: &Path) -> PathBuf {
    paths::logs_dir(root).join(BACKGROUND_LOG_FILENAME)
}

/// Rescans the storage location of `request.route` and rewrites its cache.
/// Returns the valid identifiers that were cached.
pub fn run_background_tasks(request: &BackgroundRequest<'_>) -> Result<Vec<Identifier>, BackgroundError> {
    paths::ensure_dir(&paths::logs_dir(request.root))?;
    let mut log = RunLog::create(&log_file_path(request.root))?;
    let result = run_with_log(request, &mut log);
    log.flush()?;
    result
}

/// The body of a run, writing into any log sink.
pub fn run_with_log<W: Write>(
    request: &BackgroundRequest<'_>,
    log: &mut RunLog<W>,
) -> Result<Vec<Identifier>, BackgroundError> {
    log.begin("Background Tasks")?;
    log.info(Depth::Section, &format!("version={}", GLASS_VERSION))?;
    log.info(Depth::Section, &format!("command={}", request.command))?;

    let Some(scan_root) = request.route.scan_root.as_deref() else {
        let err = BackgroundError::UnregisteredStorage(request.route.storage);
        log.error("Storage Router", &err)?;
        return Err(err);
    };
    log.info(
        Depth::Section,
        &format!("Reading Data from {}", scan_root.display()),
    )?;

    if let Err(err) = compare_drives(request, log) {
        log.error("Drive Comparator", &err)?;
        return Err(err);
    }

    let ids = match read_file_system(request, scan_root, log) {
        Ok(ids) => ids,
        Err(err) => {
            log.error("File System Reader", &err)?;
            return Err(err);
        }
    };

    log.end("Background Tasks")?;
    Ok(ids)
}

fn compare_drives<W: Write>(
    request: &BackgroundRequest<'_>,
    log: &mut RunLog<W>,
) -> Result<(), BackgroundError> {
    log.begin("Comparing Drives")?;
    log.info(
        Depth::Entry,
        &format!(
            "Found {} Drives in the json File",
            request.registry.drives.len()
        ),
    )?;
    for letter in drive_manager::check_drives(request.root, request.registry)? {
        log.warn(
            Depth::Detail,
            &format!(
                "Drive Letter {} has an IDList file but is NOT in drives.json file",
                letter
            ),
        )?;
    }
    log.end("Comparing Drives")
}

fn read_file_system<W: Write>(
    request: &BackgroundRequest<'_>,
    scan_root: &Path,
    log: &mut RunLog<W>,
) -> Result<Vec<Identifier>, BackgroundError> {
    log.begin("Loading IDs")?;

    let scan = scanner::scan_hierarchy(scan_root, request.exclusions)?;
    let mut ids = scan.valid;
    assign_revisions(&mut ids);
    log.info(Depth::Entry, &format!("found {} valid IDs", ids.len()))?;

    let duplicates = find_duplicates(&ids);
    if !duplicates.is_empty() {
        log.warn(
            Depth::Entry,
            &format!("found {} equal IDs", duplicates.len()),
        )?;
        for (later, first) in duplicates {
            log.warn(
                Depth::Detail,
                &format!(
                    "{} and {} have an equivalent ID",
                    later.path, first.path
                ),
            )?;
        }
    }

    if !scan.invalid.is_empty() {
        log.warn(
            Depth::Entry,
            &format!("found {} invalid IDs", scan.invalid.len()),
        )?;
        for invalid in &scan.invalid {
            let reason = if invalid.descriptor.is_empty() {
                "with no descriptor".to_string()
            } else {
                format!("because {}", invalid.descriptor)
            };
            log.warn(
                Depth::Detail,
                &format!("{} is invalid {}", invalid.path, reason),
            )?;
        }
    }

    log.info(
        Depth::Entry,
        &format!("Writing data to {}", request.route.cache_path.display()),
    )?;
    cache_store::export_ids(&ids, &request.route.cache_path, clock::now_utc_seconds())?;

    log.end("Loading IDs")?;
    Ok(ids)
}

/// Pairs of valid identifiers sharing a raw code, as `(later, first seen)`.
pub fn find_duplicates(ids: &[Identifier]) -> Vec<(&Identifier, &Identifier)> {
    let mut first_seen: HashMap<&str, &Identifier> = HashMap::new();
    let mut duplicates = Vec::new();
    for id in ids {
        match first_seen.get(id.raw_text.as_str()) {
            Some(first) => duplicates.push((id, *first)),
            None => {
                first_seen.insert(id.raw_text.as_str(), id);
            }
        }
    }
    duplicates
}
