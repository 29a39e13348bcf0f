// src/core/drive_manager.rs

use crate::constants::{DRIVES_FILENAME, GLASS_VERSION};
use crate::core::{clock, paths, storage_router};
use crate::models::{DriveEntry, DriveRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Represents errors that can occur while reading or editing the drive registry.
#[derive(Error, Debug)]
pub enum DriveError {
    /// A filesystem I/O error occurred.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// `drives.json` exists but cannot be parsed or written.
    #[error("Malformed drive registry: {0}")]
    Json(#[from] serde_json::Error),
    /// A data directory could not be created.
    #[error("Path error: {0}")]
    Path(#[from] paths::PathError),
    /// A drive letter must be exactly one alphabetic character.
    #[error("'{0}' is not a drive letter; use a single letter such as B.")]
    InvalidLetter(String),
    #[error("Drive '{label}' already has letter {letter}.")]
    AlreadyExists { letter: char, label: String },
    #[error("No drive is registered with letter {0}.")]
    UnknownLetter(char),
    #[error("'{0}' is not a drive field; expected 'label' or 'path'.")]
    UnknownField(String),
}

type DriveResult<T> = Result<T, DriveError>;

/// The editable fields of a registered drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveField {
    Label,
    Path,
}

impl DriveField {
    /// The setter that applies a new value to this field.
    pub fn setter(self) -> fn(&mut DriveEntry, String) {
        match self {
            Self::Label => |drive: &mut DriveEntry, value: String| drive.label = value,
            Self::Path => |drive: &mut DriveEntry, value: String| drive.path = value,
        }
    }
}

impl FromStr for DriveField {
    type Err = DriveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "label" => Ok(Self::Label),
            "path" => Ok(Self::Path),
            _ => Err(DriveError::UnknownField(s.to_string())),
        }
    }
}

/// `<root>/.glass/data/drives.json`
pub fn drives_file_path(root: &Path) -> PathBuf {
    paths::data_dir(root).join(DRIVES_FILENAME)
}

/// Loads the drive registry. A missing file is an empty registry.
pub fn load_drives(root: &Path) -> DriveResult<DriveRegistry> {
    let path = drives_file_path(root);
    if !path.exists() {
        log::warn!(
            "No drive registry at '{}'; assuming no drives.",
            path.display()
        );
        return Ok(DriveRegistry::default());
    }
    let content = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Writes the registry back, stamping it with the current time and version.
pub fn save_drives(root: &Path, registry: &mut DriveRegistry) -> DriveResult<()> {
    registry.generated = clock::now_utc_fractional();
    registry.version = GLASS_VERSION.to_string();

    paths::ensure_dir(&paths::data_dir(root))?;
    let content = serde_json::to_string_pretty(registry)?;
    fs::write(drives_file_path(root), content)?;
    Ok(())
}

/// Normalises a user-supplied drive letter (`b` → `B`).
pub fn parse_letter(text: &str) -> DriveResult<char> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok(letter.to_ascii_uppercase()),
        _ => Err(DriveError::InvalidLetter(text.to_string())),
    }
}

/// Registers a new drive.
///
/// # Errors
/// `DriveError::AlreadyExists` if the letter is taken.
pub fn add_drive(
    registry: &mut DriveRegistry,
    letter: &str,
    label: &str,
    path: &str,
) -> DriveResult<char> {
    let letter = parse_letter(letter)?;
    if let Some(existing) = registry.get(letter) {
        return Err(DriveError::AlreadyExists {
            letter,
            label: existing.label.clone(),
        });
    }
    registry.drives.push(DriveEntry {
        letter,
        label: label.to_string(),
        path: path.to_string(),
    });
    registry.drives.sort_by_key(|d| d.letter);
    Ok(letter)
}

/// Sets one field of a registered drive.
pub fn modify_drive(
    registry: &mut DriveRegistry,
    letter: &str,
    field: DriveField,
    value: &str,
) -> DriveResult<()> {
    let letter = parse_letter(letter)?;
    let drive = registry
        .get_mut(letter)
        .ok_or(DriveError::UnknownLetter(letter))?;
    (field.setter())(drive, value.to_string());
    Ok(())
}

/// Storage letters that have a cache file in the data directory but no
/// entry in the registry. The primary location counts as registered only
/// if it is listed too.
pub fn check_drives(root: &Path, registry: &DriveRegistry) -> DriveResult<Vec<char>> {
    let data_dir = paths::data_dir(root);
    if !data_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut unregistered = Vec::new();
    for entry in fs::read_dir(&data_dir)? {
        let file_name = entry?.file_name();
        let Some(letter) = storage_router::storage_from_cache_file(&file_name.to_string_lossy())
        else {
            continue;
        };
        if registry.get(letter).is_none() {
            unregistered.push(letter);
        }
    }
    unregistered.sort_unstable();
    Ok(unregistered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_registry_loads_empty() {
        let temp = TempDir::new().unwrap();
        let registry = load_drives(temp.path()).unwrap();
        assert!(registry.drives.is_empty());
    }

    #[test]
    fn test_save_then_load_keeps_drives() {
        let temp = TempDir::new().unwrap();
        let mut registry = DriveRegistry::default();
        add_drive(&mut registry, "b", "Archive", "/mnt/archive").unwrap();
        add_drive(&mut registry, "A", "Laptop", "/home/me/files").unwrap();
        save_drives(temp.path(), &mut registry).unwrap();

        let loaded = load_drives(temp.path()).unwrap();
        assert_eq!(loaded.version, GLASS_VERSION);
        assert!(loaded.generated > 0.0);
        let letters: Vec<char> = loaded.drives.iter().map(|d| d.letter).collect();
        assert_eq!(letters, vec!['A', 'B']);
        assert_eq!(loaded.label_of('B'), Some("Archive"));
    }

    #[test]
    fn test_duplicate_letter_is_rejected() {
        let mut registry = DriveRegistry::default();
        add_drive(&mut registry, "B", "Archive", "/mnt/a").unwrap();
        let err = add_drive(&mut registry, "b", "Other", "/mnt/b").unwrap_err();
        assert!(matches!(err, DriveError::AlreadyExists { letter: 'B', .. }));
        assert!(err.to_string().contains("Archive"));
    }

    #[test]
    fn test_letters_must_be_single_characters() {
        assert_eq!(parse_letter(" c ").unwrap(), 'C');
        assert!(matches!(parse_letter("BC"), Err(DriveError::InvalidLetter(_))));
        assert!(matches!(parse_letter(""), Err(DriveError::InvalidLetter(_))));
        assert!(matches!(parse_letter("1"), Err(DriveError::InvalidLetter(_))));
    }

    #[test]
    fn test_modify_uses_the_field_setter() {
        let mut registry = DriveRegistry::default();
        add_drive(&mut registry, "B", "Archive", "/mnt/a").unwrap();

        let field: DriveField = "Path".parse().unwrap();
        modify_drive(&mut registry, "b", field, "/mnt/new").unwrap();
        modify_drive(&mut registry, "B", DriveField::Label, "Cold storage").unwrap();

        let drive = registry.get('B').unwrap();
        assert_eq!(drive.path, "/mnt/new");
        assert_eq!(drive.label, "Cold storage");
    }

    #[test]
    fn test_modify_unknown_drive_fails() {
        let mut registry = DriveRegistry::default();
        let result = modify_drive(&mut registry, "Z", DriveField::Label, "x");
        assert!(matches!(result, Err(DriveError::UnknownLetter('Z'))));
        assert!("colour".parse::<DriveField>().is_err());
    }

    #[test]
    fn test_check_drives_reports_unregistered_caches() {
        let temp = TempDir::new().unwrap();
        let data = paths::data_dir(temp.path());
        fs::create_dir_all(&data).unwrap();
        for name in ["IDPaths.json", "IDPathsB.json", "IDPathsC.json", "drives.json"] {
            fs::write(data.join(name), "{}").unwrap();
        }

        let mut registry = DriveRegistry::default();
        add_drive(&mut registry, "B", "Archive", "/mnt/a").unwrap();
        assert_eq!(check_drives(temp.path(), &registry).unwrap(), vec!['A', 'C']);
    }
}
