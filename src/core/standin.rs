// src/core/standin.rs

//! Stand-in files: `<title>.glass` JSON placeholders inside an ID's folder
//! for resources that live elsewhere (a web page, a shared document).

use crate::constants::{GLASS_VERSION, STANDIN_EXTENSION};
use crate::core::clock;
use crate::models::{People, StandInFile};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StandInError {
    #[error("I/O error on stand-in '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed stand-in '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("A stand-in titled '{title}' already exists at '{path}'.")]
    DuplicateTitle { title: String, path: String },
    #[error("'{0}' cannot be used as a stand-in title.")]
    InvalidTitle(String),
    #[error("'{0}' is not a stand-in field; expected title, description, url or people.")]
    UnknownField(String),
}

/// A stand-in file loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StandIn {
    pub file_path: PathBuf,
    pub data: StandInFile,
}

/// The user-editable fields of a stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandInField {
    Title,
    Description,
    Url,
    People,
}

impl StandInField {
    pub fn setter(self) -> fn(&mut StandInFile, &str) {
        match self {
            Self::Title => |file: &mut StandInFile, value: &str| file.title = value.to_string(),
            Self::Description => {
                |file: &mut StandInFile, value: &str| file.description = value.to_string()
            }
            Self::Url => |file: &mut StandInFile, value: &str| file.url = value.to_string(),
            Self::People => |file: &mut StandInFile, value: &str| file.people = People::from_list(value),
        }
    }
}

impl FromStr for StandInField {
    type Err = StandInError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "description" | "desc" => Ok(Self::Description),
            "url" | "path" => Ok(Self::Url),
            "people" => Ok(Self::People),
            _ => Err(StandInError::UnknownField(s.to_string())),
        }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StandInError + '_ {
    move |source| StandInError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn is_standin(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == STANDIN_EXTENSION)
}

/// The file a stand-in titled `title` is stored in, inside `dir`.
pub fn standin_path(dir: &Path, title: &str) -> Result<PathBuf, StandInError> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '\\']) || trimmed == "." || trimmed == ".." {
        return Err(StandInError::InvalidTitle(title.to_string()));
    }
    Ok(dir.join(format!("{}.{}", trimmed, STANDIN_EXTENSION)))
}

pub fn load_standin(path: &Path) -> Result<StandIn, StandInError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let data = serde_json::from_str(&content).map_err(|source| StandInError::Json {
        path: path.display().to_string(),
        source,
    })?;
    Ok(StandIn {
        file_path: path.to_path_buf(),
        data,
    })
}

fn write_standin(path: &Path, data: &StandInFile) -> Result<(), StandInError> {
    let json = serde_json::to_string_pretty(data).map_err(|source| StandInError::Json {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, json).map_err(io_error(path))
}

/// Every stand-in in `dir`, sorted by file name. Unreadable files are
/// logged and skipped.
pub fn list_standins(dir: &Path) -> Result<Vec<StandIn>, StandInError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error(dir))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_standin(path))
        .collect();
    paths.sort();

    let mut standins = Vec::new();
    for path in paths {
        match load_standin(&path) {
            Ok(standin) => standins.push(standin),
            Err(e) => log::warn!("Skipping stand-in: {}", e),
        }
    }
    Ok(standins)
}

/// Creates a stand-in in `dir`.
///
/// # Errors
/// `StandInError::DuplicateTitle` if a stand-in in `dir` already uses the
/// title.
pub fn create_standin(
    dir: &Path,
    title: &str,
    description: &str,
    url: &str,
    people: People,
) -> Result<StandIn, StandInError> {
    let title = title.trim();
    let file_path = standin_path(dir, title)?;
    ensure_title_free(dir, title, None)?;

    let data = StandInFile {
        title: title.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        people,
        created: clock::now_utc_fractional(),
        glass_version: GLASS_VERSION.to_string(),
    };
    write_standin(&file_path, &data)?;
    log::info!("Created stand-in '{}'", file_path.display());
    Ok(StandIn { file_path, data })
}

/// Sets one field of the stand-in at `path` and rewrites it. A new title
/// also renames the file.
pub fn modify_standin(path: &Path, field: StandInField, value: &str) -> Result<StandIn, StandInError> {
    let mut standin = load_standin(path)?;
    (field.setter())(&mut standin.data, value);

    if field == StandInField::Title {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let new_path = standin_path(dir, value)?;
        standin.data.title = value.trim().to_string();
        ensure_title_free(dir, &standin.data.title, Some(path))?;
        write_standin(&new_path, &standin.data)?;
        if new_path != path {
            fs::remove_file(path).map_err(io_error(path))?;
        }
        standin.file_path = new_path;
    } else {
        write_standin(path, &standin.data)?;
    }
    Ok(standin)
}

/// Fails if a stand-in other than `ignore` in `dir` is titled `title`.
fn ensure_title_free(dir: &Path, title: &str, ignore: Option<&Path>) -> Result<(), StandInError> {
    let clash = list_standins(dir)?
        .into_iter()
        .find(|other| other.data.title == title && Some(other.file_path.as_path()) != ignore);
    match clash {
        Some(other) => Err(StandInError::DuplicateTitle {
            title: title.to_string(),
            path: other.file_path.display().to_string(),
        }),
        None => Ok(()),
    }
}
