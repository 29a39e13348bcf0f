// src/core/cache_store.rs

//! # Cache Store
//!
//! Persists the identifiers of one storage location as
//! `.glass/data/IDPaths<X>.json`. Loading trusts the file: records are turned
//! back into identifiers without re-running the grammar.

use crate::core::identifier::Identifier;
use crate::models::{CacheDocument, CacheMetadata};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("No ID cache for storage location '{storage}' at '{path}'.")]
    CacheNotFound { storage: char, path: String },
    #[error("I/O error on ID cache '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed ID cache '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not replace ID cache '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },
}

/// The loaded identifiers of one storage location, keyed by raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdCache {
    pub created_utc: u64,
    pub ids: BTreeMap<String, Identifier>,
}

impl IdCache {
    pub fn from_ids(ids: &[Identifier], created_utc: u64) -> Self {
        Self {
            created_utc,
            ids: ids
                .iter()
                .map(|id| (id.raw_text.clone(), id.clone()))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&Identifier> {
        self.ids.get(code)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers in numeric code order.
    pub fn sorted(&self) -> Vec<&Identifier> {
        let mut ids: Vec<&Identifier> = self.ids.values().collect();
        ids.sort_by(|a, b| a.numeric_code.cmp(&b.numeric_code));
        ids
    }
}

/// Builds the cache document for `ids`.
pub fn to_document(ids: &[Identifier], created_utc: u64) -> CacheDocument {
    let mut sorted: Vec<&Identifier> = ids.iter().collect();
    sorted.sort_by(|a, b| a.numeric_code.cmp(&b.numeric_code));

    CacheDocument {
        meta_data: CacheMetadata { created_utc },
        ids: sorted
            .into_iter()
            .map(|id| (id.raw_text.clone(), id.to_record()))
            .collect(),
    }
}

/// Rebuilds identifiers from a cache document, in numeric code order.
pub fn from_document(document: &CacheDocument) -> Vec<Identifier> {
    let mut ids: Vec<Identifier> = document
        .ids
        .iter()
        .map(|(raw_text, record)| Identifier::from_record(raw_text, record))
        .collect();
    ids.sort_by(|a, b| a.numeric_code.cmp(&b.numeric_code));
    ids
}

/// Writes `ids` to `cache_path`, replacing any previous cache atomically.
pub fn export_ids(ids: &[Identifier], cache_path: &Path, created_utc: u64) -> Result<(), CacheError> {
    let document = to_document(ids, created_utc);
    write_json_atomic(&document, cache_path)
}

/// Reads the cache of storage location `storage` from `cache_path`.
///
/// # Errors
/// [`CacheError::CacheNotFound`] when the file does not exist; callers decide
/// whether that means "rescan" or "give up".
pub fn import_ids(cache_path: &Path, storage: char) -> Result<IdCache, CacheError> {
    let content = fs::read_to_string(cache_path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            CacheError::CacheNotFound {
                storage,
                path: cache_path.display().to_string(),
            }
        } else {
            CacheError::Io {
                path: cache_path.display().to_string(),
                source,
            }
        }
    })?;

    let document: CacheDocument =
        serde_json::from_str(&content).map_err(|source| CacheError::Json {
            path: cache_path.display().to_string(),
            source,
        })?;

    log::debug!(
        "Loaded {} IDs from '{}'",
        document.ids.len(),
        cache_path.display()
    );
    Ok(IdCache::from_ids(
        &from_document(&document),
        document.meta_data.created_utc,
    ))
}

/// Serializes `value` as 4-space indented JSON into a temp file beside
/// `path`, then renames it over `path`.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), CacheError> {
    let io_err = |source| CacheError::Io {
        path: path.display().to_string(),
        source,
    };
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| CacheError::Json {
            path: path.display().to_string(),
            source,
        })?;

    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    temp_file.write_all(&buffer).map_err(io_err)?;
    temp_file
        .persist(path)
        .map_err(|source| CacheError::Persist {
            path: path.display().to_string(),
            source,
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IdLevel;
    use tempfile::TempDir;

    fn sample_ids() -> Vec<Identifier> {
        let base = "/files/20 - Work/21 - Clients/21.01 - Acme";
        vec![
            Identifier::classify("21.01.02", &format!("{}/21.01.02 - Logo", base), "Logo"),
            Identifier::classify("20", "/files/20 - Work", "Work"),
            Identifier::classify(
                "21.01.01B2",
                &format!("{}/21.01.01 - Website/B2 - Launch", base),
                "Launch",
            ),
            Identifier::classify("21.01", base, "Acme"),
        ]
    }

    #[test]
    fn test_export_then_import_keeps_identifiers() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join(".glass/data/IDPaths.json");

        let ids = sample_ids();
        assert!(ids.iter().all(Identifier::is_valid));
        export_ids(&ids, &cache_path, 1_700_000_000).unwrap();

        let cache = import_ids(&cache_path, 'A').unwrap();
        assert_eq!(cache.created_utc, 1_700_000_000);
        assert_eq!(cache.len(), 4);
        let child = cache.get("21.01.01B2").unwrap();
        assert_eq!(child.level, IdLevel::ChildProject);
        assert_eq!(child.revision, Some(2));
        assert_eq!(child, &ids[2]);
    }

    #[test]
    fn test_document_survives_a_reload_unchanged() {
        let document = to_document(&sample_ids(), 42);
        let json = serde_json::to_string(&document).unwrap();
        let parsed: CacheDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(to_document(&from_document(&parsed), 42), document);
    }

    #[test]
    fn test_export_uses_the_documented_field_names() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("IDPaths.json");
        export_ids(&sample_ids(), &cache_path, 7).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&cache_path).unwrap()).unwrap();
        assert_eq!(value["metaData"]["createdUTC"], 7);
        let record = &value["IDs"]["21.01.02"];
        assert_eq!(record["numericalID"], "21.01.02");
        assert_eq!(record["type"], "project");
        assert_eq!(record["storageLocation"], "A");
        assert_eq!(record["revisionStage"], "A");
        assert_eq!(record["revisionCount"], -1);
    }

    #[test]
    fn test_export_keys_follow_numeric_code_order() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("IDPaths.json");
        let ids = vec![
            Identifier::classify("30", "", "Home"),
            Identifier::classify("B21", "", "Archive"),
            Identifier::classify("20", "", "Work"),
        ];
        export_ids(&ids, &cache_path, 7).unwrap();

        let text = fs::read_to_string(&cache_path).unwrap();
        let position = |key: &str| text.find(&format!("\"{}\": {{", key)).unwrap();
        assert!(position("20") < position("B21"));
        assert!(position("B21") < position("30"));
    }

    #[test]
    fn test_import_does_not_revalidate() {
        // A record whose path would fail the cross-check is trusted as-is.
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("IDPaths.json");
        let json = r#"{
            "metaData": {"createdUTC": 1},
            "IDs": {"21": {
                "numericalID": "21",
                "path": "/files/30 - Home/21 - Misplaced",
                "type": "category",
                "descriptor": "Misplaced",
                "storageLocation": "A",
                "revisionStage": "A",
                "revisionCount": -1
            }}
        }"#;
        fs::write(&cache_path, json).unwrap();

        let cache = import_ids(&cache_path, 'A').unwrap();
        assert_eq!(cache.get("21").unwrap().level, IdLevel::Category);
    }

    #[test]
    fn test_missing_cache_is_cache_not_found() {
        let temp = TempDir::new().unwrap();
        let result = import_ids(&temp.path().join("IDPathsB.json"), 'B');
        assert!(matches!(
            result,
            Err(CacheError::CacheNotFound { storage: 'B', .. })
        ));
    }

    #[test]
    fn test_malformed_cache_is_a_json_error() {
        let temp = TempDir::new().unwrap();
        let cache_path = temp.path().join("IDPaths.json");
        fs::write(&cache_path, "{ not json").unwrap();
        assert!(matches!(
            import_ids(&cache_path, 'A'),
            Err(CacheError::Json { .. })
        ));
    }

    #[test]
    fn test_sorted_orders_by_numeric_code() {
        let cache = IdCache::from_ids(&sample_ids(), 0);
        let codes: Vec<&str> = cache.sorted().iter().map(|id| id.raw_text.as_str()).collect();
        assert_eq!(codes, vec!["20", "21.01", "21.01.01B2", "21.01.02"]);
    }
}
