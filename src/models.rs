// src/models.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::GLASS_DIR;

// --- IDENTIFIER LEVELS ---

/// The five levels of the hierarchy, broadest first, plus `Invalid`.
///
/// The derived ordering is the nesting order: `Area < Category < Subfolder <
/// Project < ChildProject`. `Invalid` sorts last and is never treated as an
/// ancestor of anything.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum IdLevel {
    Area,
    Category,
    Subfolder,
    Project,
    ChildProject,
    Invalid,
}

impl IdLevel {
    /// The valid levels in scan order.
    pub const HIERARCHY: [Self; 5] = [
        Self::Area,
        Self::Category,
        Self::Subfolder,
        Self::Project,
        Self::ChildProject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::Category => "category",
            Self::Subfolder => "subfolder",
            Self::Project => "project",
            Self::ChildProject => "child-project",
            Self::Invalid => "invalid",
        }
    }

    /// The level found `depth` titled folders below the hierarchy root.
    pub fn from_depth(depth: usize) -> Option<Self> {
        Self::HIERARCHY.get(depth).copied()
    }

    /// The level directly above this one, if any.
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::Area | Self::Invalid => None,
            Self::Category => Some(Self::Area),
            Self::Subfolder => Some(Self::Category),
            Self::Project => Some(Self::Subfolder),
            Self::ChildProject => Some(Self::Project),
        }
    }
}

impl fmt::Display for IdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- ID CACHE MODELS (`.glass/data/IDPaths<X>.json`) ---

/// The on-disk ID cache of one storage location.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CacheDocument {
    #[serde(rename = "metaData")]
    pub meta_data: CacheMetadata,
    /// Keyed by the raw ID text, in numeric code order.
    #[serde(rename = "IDs")]
    pub ids: IndexMap<String, CacheRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetadata {
    #[serde(rename = "createdUTC")]
    pub created_utc: u64,
}

/// One flattened identifier as stored in the cache.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    #[serde(rename = "numericalID")]
    pub numerical_id: String,
    pub path: String,
    #[serde(rename = "type")]
    pub level: IdLevel,
    pub descriptor: String,
    pub storage_location: char,
    pub revision_stage: char,
    /// `-1` while no revision has been assigned.
    pub revision_count: i64,
}

// --- DRIVE REGISTRY MODELS (`.glass/data/drives.json`) ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DriveEntry {
    pub letter: char,
    pub label: String,
    pub path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DriveRegistry {
    #[serde(default)]
    pub generated: f64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub drives: Vec<DriveEntry>,
}

impl DriveRegistry {
    pub fn get(&self, letter: char) -> Option<&DriveEntry> {
        self.drives.iter().find(|d| d.letter == letter)
    }

    pub fn get_mut(&mut self, letter: char) -> Option<&mut DriveEntry> {
        self.drives.iter_mut().find(|d| d.letter == letter)
    }

    /// The display label of a storage letter, if registered.
    pub fn label_of(&self, letter: char) -> Option<&str> {
        self.get(letter).map(|d| d.label.as_str())
    }
}

// --- STAND-IN MODELS (`<title>.glass`) ---

/// People attached to a stand-in. Older files store a single free-text
/// string, newer ones a list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum People {
    Many(Vec<String>),
    One(String),
}

impl People {
    /// Parses a comma separated list (`"me, alice"`).
    pub fn from_list(list: &str) -> Self {
        Self::Many(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Many(names) => names.iter().map(String::as_str).collect(),
            Self::One(name) => vec![name.as_str()],
        }
    }
}

impl Default for People {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// A stand-in file: a placeholder in the hierarchy for a resource that lives
/// elsewhere (a URL, a shared document).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct StandInFile {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub people: People,
    #[serde(default)]
    pub created: f64,
    #[serde(default)]
    pub glass_version: String,
}

// --- BACKUP MODELS ---

/// A fingerprint of the hierarchy, written before the tree is copied to
/// another drive.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub generated: f64,
    pub version: String,
    pub id_count: usize,
    #[serde(rename = "fileHash")]
    pub file_hash: String,
    pub drive: char,
    pub filesystem: Vec<String>,
}

// --- USER CONFIGURATION (`~/.config/glass/config.toml`) ---

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GlassConfig {
    /// Root of the primary storage location. `~` and `$VARS` are expanded.
    pub root_path: String,
    /// Folder names skipped at every depth of a scan (case-insensitive).
    #[serde(default = "default_excluded_folders")]
    pub excluded_folders: Vec<String>,
    pub markdown_path: Option<String>,
    pub project_template_path: Option<String>,
    /// Display labels for revision stage letters (`A = "Planning"`).
    #[serde(default)]
    pub revision_labels: BTreeMap<String, String>,
}

fn default_excluded_folders() -> Vec<String> {
    vec![GLASS_DIR.to_string()]
}

impl GlassConfig {
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            excluded_folders: default_excluded_folders(),
            markdown_path: None,
            project_template_path: None,
            revision_labels: BTreeMap::new(),
        }
    }

    /// The label of a revision stage, falling back to the letter itself.
    pub fn revision_label(&self, stage: char) -> String {
        self.revision_labels
            .get(&stage.to_string())
            .cloned()
            .unwrap_or_else(|| stage.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_follows_nesting() {
        assert!(IdLevel::Area < IdLevel::Category);
        assert!(IdLevel::Subfolder < IdLevel::Project);
        assert!(IdLevel::Project < IdLevel::ChildProject);
        assert!(IdLevel::ChildProject < IdLevel::Invalid);
    }

    #[test]
    fn test_level_serializes_kebab_case() {
        let json = serde_json::to_string(&IdLevel::ChildProject).unwrap();
        assert_eq!(json, "\"child-project\"");
        let level: IdLevel = serde_json::from_str("\"subfolder\"").unwrap();
        assert_eq!(level, IdLevel::Subfolder);
    }

    #[test]
    fn test_people_accepts_string_or_list() {
        let one: People = serde_json::from_str("\"me\"").unwrap();
        assert_eq!(one.names(), vec!["me"]);
        let many: People = serde_json::from_str("[\"me\", \"alice\"]").unwrap();
        assert_eq!(many.names(), vec!["me", "alice"]);
        assert_eq!(People::from_list(" me, ,alice "), many);
    }

    #[test]
    fn test_config_defaults_exclude_glass_dir() {
        let config: GlassConfig = toml::from_str("root_path = \"~/files\"").unwrap();
        assert_eq!(config.excluded_folders, vec![".glass".to_string()]);
        assert_eq!(config.revision_label('B'), "B");
    }
}
