// src/core/backup.rs

//! Backup fingerprints. Before the hierarchy is copied to another drive, a
//! record of every ID title and a hash over them is written to
//! `<root>/identifier.json`, with a dated copy kept under
//! `.glass/backups/`. Comparing fingerprints later tells whether a copy is
//! out of date.

use crate::constants::{GLASS_VERSION, IDENTIFIER_FILENAME, TITLE_SEPARATOR};
use crate::core::identifier::Identifier;
use crate::core::{clock, paths};
use crate::models::BackupRecord;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("I/O error on backup '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed backup record '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("A backup for drive {drive} dated today already exists at '{path}'. Use --force to replace it.")]
    AlreadyExists { drive: char, path: String },
    #[error(transparent)]
    Path(#[from] paths::PathError),
}

/// How `encode_backup` writes its record.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// The drive the backup will be stored on.
    pub drive: char,
    /// Skip the dated copy under `.glass/backups/`.
    pub single: bool,
    /// Replace a dated copy written earlier the same day.
    pub force: bool,
}

/// What `encode_backup` wrote.
#[derive(Debug, Clone)]
pub struct EncodedBackup {
    pub record: BackupRecord,
    pub identifier_path: PathBuf,
    pub dated_path: Option<PathBuf>,
}

/// `"<code> - <descriptor>"` for every identifier, sorted.
pub fn filesystem_titles<'a>(ids: impl IntoIterator<Item = &'a Identifier>) -> Vec<String> {
    let mut titles: Vec<String> = ids
        .into_iter()
        .map(|id| format!("{}{}{}", id.raw_text, TITLE_SEPARATOR, id.descriptor))
        .collect();
    titles.sort();
    titles
}

/// Hex BLAKE3 digest of the space-joined titles.
pub fn fingerprint(titles: &[String]) -> String {
    let hash = blake3::hash(titles.join(" ").as_bytes());
    hex::encode(hash.as_bytes())
}

pub fn build_record(ids: &[&Identifier], drive: char) -> BackupRecord {
    let filesystem = filesystem_titles(ids.iter().copied());
    BackupRecord {
        generated: clock::now_utc_fractional(),
        version: GLASS_VERSION.to_string(),
        id_count: ids.len(),
        file_hash: fingerprint(&filesystem),
        drive: drive.to_ascii_uppercase(),
        filesystem,
    }
}

/// `<root>/.glass/backups/<drive><date>.json`
pub fn dated_backup_path(root: &Path, drive: char, date: &str) -> PathBuf {
    paths::backups_dir(root).join(format!("{}{}.json", drive.to_ascii_uppercase(), date))
}

fn write_record(path: &Path, record: &BackupRecord) -> Result<(), BackupError> {
    let json = serde_json::to_string_pretty(record).map_err(|source| BackupError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(|source| BackupError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Writes the fingerprint of `ids` to `<root>/identifier.json` and, unless
/// `options.single`, to the dated copy for `today` (`YYYY-MM-DD`).
///
/// # Errors
/// `BackupError::AlreadyExists` when the dated copy exists and
/// `options.force` is not set. Nothing is written in that case.
pub fn encode_backup(
    root: &Path,
    ids: &[&Identifier],
    options: EncodeOptions,
    today: &str,
) -> Result<EncodedBackup, BackupError> {
    let record = build_record(ids, options.drive);

    let dated_path = if options.single {
        None
    } else {
        let path = dated_backup_path(root, record.drive, today);
        if path.exists() && !options.force {
            return Err(BackupError::AlreadyExists {
                drive: record.drive,
                path: path.display().to_string(),
            });
        }
        Some(path)
    };

    let identifier_path = root.join(IDENTIFIER_FILENAME);
    write_record(&identifier_path, &record)?;
    if let Some(path) = &dated_path {
        paths::ensure_dir(&paths::backups_dir(root))?;
        write_record(path, &record)?;
    }

    Ok(EncodedBackup {
        record,
        identifier_path,
        dated_path,
    })
}

/// Every dated backup record, oldest first. Unreadable files are logged and
/// skipped.
pub fn list_backups(root: &Path) -> Result<Vec<(PathBuf, BackupRecord)>, BackupError> {
    let dir = paths::backups_dir(root);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&dir).map_err(|source| BackupError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut backups = Vec::new();
    for path in entries.filter_map(Result::ok).map(|e| e.path()) {
        if path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<BackupRecord>(&text).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(record) => backups.push((path, record)),
            Err(e) => log::warn!("Skipping backup '{}': {}", path.display(), e),
        }
    }
    backups.sort_by(|a, b| a.1.generated.total_cmp(&b.1.generated));
    Ok(backups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ids() -> Vec<Identifier> {
        vec![
            Identifier::classify("21", "", "Clients"),
            Identifier::classify("20", "", "Work"),
        ]
    }

    fn encode(root: &Path, force: bool, single: bool) -> Result<EncodedBackup, BackupError> {
        let ids = ids();
        let refs: Vec<&Identifier> = ids.iter().collect();
        let options = EncodeOptions {
            drive: 'b',
            single,
            force,
        };
        encode_backup(root, &refs, options, "2024-05-01")
    }

    #[test]
    fn test_record_lists_sorted_titles_and_hash() {
        let ids = ids();
        let refs: Vec<&Identifier> = ids.iter().collect();
        let record = build_record(&refs, 'b');

        assert_eq!(record.filesystem, vec!["20 - Work", "21 - Clients"]);
        assert_eq!(record.id_count, 2);
        assert_eq!(record.drive, 'B');
        assert_eq!(record.file_hash.len(), 64);
        assert_eq!(
            record.file_hash,
            hex::encode(blake3::hash(b"20 - Work 21 - Clients").as_bytes())
        );
    }

    #[test]
    fn test_fingerprint_changes_with_titles() {
        let a = fingerprint(&["20 - Work".to_string()]);
        let b = fingerprint(&["20 - Jobs".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_encode_writes_root_and_dated_copy() {
        let temp = TempDir::new().unwrap();
        let encoded = encode(temp.path(), false, false).unwrap();

        assert!(temp.path().join("identifier.json").is_file());
        let dated = encoded.dated_path.unwrap();
        assert_eq!(dated, temp.path().join(".glass/backups/B2024-05-01.json"));
        assert!(dated.is_file());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&dated).unwrap()).unwrap();
        assert_eq!(json["drive"], "B");
        assert!(json["fileHash"].is_string());
    }

    #[test]
    fn test_existing_dated_copy_needs_force() {
        let temp = TempDir::new().unwrap();
        encode(temp.path(), false, false).unwrap();

        let err = encode(temp.path(), false, false).unwrap_err();
        assert!(matches!(err, BackupError::AlreadyExists { drive: 'B', .. }));
        assert!(encode(temp.path(), true, false).is_ok());
    }

    #[test]
    fn test_single_skips_dated_copy() {
        let temp = TempDir::new().unwrap();
        let encoded = encode(temp.path(), false, true).unwrap();
        assert!(encoded.dated_path.is_none());
        assert!(list_backups(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_list_backups_reads_records() {
        let temp = TempDir::new().unwrap();
        encode(temp.path(), false, false).unwrap();
        fs::write(paths::backups_dir(temp.path()).join("junk.json"), "nope").unwrap();

        let backups = list_backups(temp.path()).unwrap();
        assert_eq!(backups.len(), 1);
        assert_eq!(backups[0].1.id_count, 2);
    }
}
