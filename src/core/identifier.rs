//! # Identifier Grammar
//!
//! Parses the short code at the start of a folder name (`21.01.03 - Title`)
//! into a typed, leveled [`Identifier`], and cross-checks the code against the
//! folder chain it was found in.
//!
//! The grammar, on the code with any storage letter stripped:
//!
//! - no `.`: `d0` is an **area**, `dd` a **category**;
//! - one `.`: a **subfolder** when the final two characters are a number;
//! - two or more `.`: a **project** when everything after the second `.` is a
//!   number, or a **child-project** when that suffix ends in a non-digit stage
//!   letter followed by a single revision digit (`21.01.03B2`).
//!
//! Classification failures are data, not errors: they produce an identifier
//! at [`IdLevel::Invalid`] whose descriptor explains the problem.

use crate::constants::{PRIMARY_STORAGE, TITLE_SEPARATOR};
use crate::models::{CacheRecord, IdLevel};
use std::path::PathBuf;
use thiserror::Error;

/// Code length of each ancestor prefix (`21`, `21.01`, `21.01.03`).
const CATEGORY_CODE_LEN: usize = 2;
const SUBFOLDER_CODE_LEN: usize = 5;
const PROJECT_CODE_LEN: usize = 8;

/// The default revision stage of projects with no revisions.
pub const DEFAULT_REVISION_STAGE: char = 'A';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The code fails the grammar or the path cross-check.
    #[error("'{code}' is not a valid ID: {reason}")]
    InvalidIdentifier { code: String, reason: String },
    /// An ancestor was requested that this identifier cannot have.
    #[error("Invalid operation on ID '{code}': {reason}")]
    InvalidOperation { code: String, reason: String },
}

/// A classified identifier and the folder it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The code as found, including a leading storage letter if any.
    pub raw_text: String,
    /// `raw_text` without the storage letter.
    pub numeric_code: String,
    pub level: IdLevel,
    pub storage_location: char,
    /// The folder title, or the reason for an `Invalid` level.
    pub descriptor: String,
    /// Absolute folder path in canonical (forward-slash) form.
    pub path: String,
    pub revision_stage: char,
    /// `None` until assigned by the grammar or the revision aggregator.
    pub revision: Option<u32>,
    /// The level the grammar settled on before a path mismatch demoted it.
    claimed_level: Option<IdLevel>,
}

impl Identifier {
    fn blank(raw_text: &str, path: &str, descriptor: &str) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            numeric_code: raw_text.to_string(),
            level: IdLevel::Invalid,
            storage_location: PRIMARY_STORAGE,
            descriptor: descriptor.to_string(),
            path: path.replace('\\', "/"),
            revision_stage: DEFAULT_REVISION_STAGE,
            revision: None,
            claimed_level: None,
        }
    }

    /// Classifies `raw_text` and validates it against `path`.
    ///
    /// `descriptor` is the folder title; it is replaced by the failure reason
    /// when the identifier turns out invalid.
    pub fn classify(raw_text: &str, path: &str, descriptor: &str) -> Self {
        let mut id = Self::blank(&normalize_code(raw_text), path, descriptor);
        if let Err(reason) = id.detect_level() {
            id.invalidate(reason);
            return id;
        }

        id.claimed_level = Some(id.level);
        if let Err(reason) = id.validate_path() {
            id.invalidate(reason);
        }
        id
    }

    /// An invalid entry for a folder whose name carries no ID at all.
    pub fn unparsed(path: &str, reason: &str) -> Self {
        Self::blank("", path, reason)
    }

    /// Parses a bare code typed by a user, without any path cross-check.
    ///
    /// # Errors
    /// Returns [`IdError::InvalidIdentifier`] when the grammar rejects the code.
    pub fn parse(code: &str) -> Result<Self, IdError> {
        let id = Self::classify(code.trim(), "", "");
        if id.is_valid() {
            Ok(id)
        } else {
            Err(IdError::InvalidIdentifier {
                code: code.to_string(),
                reason: id.descriptor,
            })
        }
    }

    /// Rebuilds an identifier from a cache record. The record is trusted:
    /// no classification or validation runs.
    pub fn from_record(raw_text: &str, record: &CacheRecord) -> Self {
        Self {
            raw_text: raw_text.to_string(),
            numeric_code: record.numerical_id.clone(),
            level: record.level,
            storage_location: record.storage_location,
            descriptor: record.descriptor.clone(),
            path: record.path.clone(),
            revision_stage: record.revision_stage,
            revision: u32::try_from(record.revision_count).ok(),
            claimed_level: (record.level != IdLevel::Invalid).then_some(record.level),
        }
    }

    /// Flattens the identifier into its cache record.
    pub fn to_record(&self) -> CacheRecord {
        CacheRecord {
            numerical_id: self.numeric_code.clone(),
            path: self.path.clone(),
            level: self.level,
            descriptor: self.descriptor.clone(),
            storage_location: self.storage_location,
            revision_stage: self.revision_stage,
            revision_count: self.revision.map_or(-1, i64::from),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.level != IdLevel::Invalid
    }

    /// The level assigned by the grammar, even if the path check later
    /// demoted the identifier to `Invalid`.
    pub fn claimed_level(&self) -> Option<IdLevel> {
        self.claimed_level
    }

    /// The folder as a filesystem path.
    pub fn fs_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// Returns the code of the ancestor at `level` that this identifier
    /// falls within (`21.01.03B2` → project `21.01.03`, area `20`).
    ///
    /// # Errors
    /// [`IdError::InvalidOperation`] when called on an invalid identifier, or
    /// when `level` is deeper than the identifier's own level.
    pub fn ancestor_code(&self, level: IdLevel) -> Result<String, IdError> {
        if self.level == IdLevel::Invalid {
            return Err(self.invalid_operation(format!(
                "cannot get the {} of an invalid ID",
                level
            )));
        }
        if level > self.level {
            return Err(self.invalid_operation(format!(
                "cannot find the {} of an ID at level {}",
                level, self.level
            )));
        }

        let code = &self.numeric_code;
        match level {
            IdLevel::Area => {
                let first = code.chars().next().unwrap_or('0');
                Ok(format!("{}0", first))
            }
            IdLevel::Category => Ok(char_prefix(code, CATEGORY_CODE_LEN).to_string()),
            IdLevel::Subfolder => Ok(char_prefix(code, SUBFOLDER_CODE_LEN).to_string()),
            IdLevel::Project => Ok(char_prefix(code, PROJECT_CODE_LEN).to_string()),
            IdLevel::ChildProject => Ok(code.clone()),
            IdLevel::Invalid => Err(self.invalid_operation(
                "'invalid' is not a level of the hierarchy".to_string(),
            )),
        }
    }

    /// The project a child-project belongs to: its code truncated to the
    /// project prefix.
    pub fn parent_project_code(&self) -> Option<&str> {
        (self.level == IdLevel::ChildProject)
            .then(|| char_prefix(&self.numeric_code, PROJECT_CODE_LEN))
    }

    fn invalid_operation(&self, reason: String) -> IdError {
        IdError::InvalidOperation {
            code: self.raw_text.clone(),
            reason,
        }
    }

    fn invalidate(&mut self, reason: String) {
        self.level = IdLevel::Invalid;
        self.descriptor = reason;
    }

    /// Runs the grammar on `raw_text`, setting the storage location, numeric
    /// code, level and (for child-projects) the revision.
    fn detect_level(&mut self) -> Result<(), String> {
        let mut chars = self.raw_text.chars();
        let Some(first) = chars.next() else {
            return Err("ID is too short".to_string());
        };
        if chars.clone().next().is_none() {
            return Err("ID is too short".to_string());
        }

        if !first.is_ascii_digit() {
            // A leading letter selects another storage location.
            self.storage_location = first;
            self.numeric_code = chars.as_str().to_string();
        }

        let numeric: Vec<char> = self.numeric_code.chars().collect();
        let depth = numeric.iter().filter(|c| **c == '.').count();

        self.level = match depth {
            0 => {
                let (Some(&area_digit), Some(&category_digit)) = (numeric.first(), numeric.get(1))
                else {
                    return Err("ID is too short".to_string());
                };
                if area_digit.is_ascii_digit() && category_digit == '0' {
                    IdLevel::Area
                } else if category_digit.is_ascii_digit() {
                    IdLevel::Category
                } else if !area_digit.is_ascii_digit() {
                    return Err("This ID does not have a number for the Area".to_string());
                } else {
                    return Err("This ID does not have a number for the Category".to_string());
                }
            }
            1 => {
                let tail: String = numeric.iter().skip(numeric.len().saturating_sub(2)).collect();
                if tail.parse::<i64>().is_err() {
                    return Err("The Subfolder ID contains characters".to_string());
                }
                IdLevel::Subfolder
            }
            _ => self.detect_project_level()?,
        };
        Ok(())
    }

    /// Everything after the second `.` is the project suffix: a plain number
    /// for a project, `<stage letter><revision digit>` at the end for a
    /// child-project.
    fn detect_project_level(&mut self) -> Result<IdLevel, String> {
        let suffix = self.numeric_code.splitn(3, '.').nth(2).unwrap_or_default();
        if suffix.parse::<i64>().is_ok() {
            return Ok(IdLevel::Project);
        }

        let mut tail = suffix.chars().rev();
        match (tail.next(), tail.next()) {
            (Some(revision), Some(stage)) if revision.is_ascii_digit() && !stage.is_ascii_digit() => {
                self.revision_stage = stage;
                self.revision = revision.to_digit(10);
                Ok(IdLevel::ChildProject)
            }
            _ => Err(
                "Invalid Project ID, Either you have a 2 digit version number or no Revision Letter"
                    .to_string(),
            ),
        }
    }

    /// Cross-checks the code against the titled folders in its path.
    ///
    /// The first path segment carrying a title separator is the area folder;
    /// each following titled segment is one level deeper. Every segment down
    /// to the project level must carry this identifier's ancestor code.
    fn validate_path(&self) -> Result<(), String> {
        let mut root_index: Option<usize> = None;

        for (path_index, section) in self.path.split('/').enumerate() {
            let Some((section_code, _)) = split_folder_name(section) else {
                continue;
            };
            let root = *root_index.get_or_insert(path_index);
            let Some(level) = IdLevel::from_depth(path_index - root) else {
                continue;
            };
            if level == IdLevel::ChildProject {
                // Child folders are named by their revision suffix only.
                continue;
            }

            let found = strip_storage_letter(section_code);
            let expected = self.ancestor_code(level).map_err(|_| {
                format!(
                    "The path places this {} ID {} at the {} level, where the path indicates ID {}",
                    self.level, self.numeric_code, level, found
                )
            })?;
            if found != expected {
                return Err(format!(
                    "There is a mismatch in the path. The object has {} ID {} but the path indicates it has ID {}",
                    level, expected, found
                ));
            }
        }
        Ok(())
    }
}

/// Trims `code` and uppercases a leading storage letter, so `b21.01` and
/// `B21.01` name the same identifier.
pub fn normalize_code(code: &str) -> String {
    let code = code.trim();
    let mut chars = code.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() => {
            format!("{}{}", first.to_ascii_uppercase(), chars.as_str())
        }
        _ => code.to_string(),
    }
}

/// Splits a folder name into its code and title. A name needs exactly one
/// title separator.
pub fn split_folder_name(name: &str) -> Option<(&str, &str)> {
    let (code, title) = name.split_once(TITLE_SEPARATOR)?;
    (!title.contains(TITLE_SEPARATOR)).then_some((code, title))
}

/// The first `len` characters of `code`, or all of it when shorter.
fn char_prefix(code: &str, len: usize) -> &str {
    match code.char_indices().nth(len) {
        Some((byte_index, _)) => code.get(..byte_index).unwrap_or(code),
        None => code,
    }
}

/// Folder codes on secondary storage carry the storage letter; the ancestor
/// codes being compared never do.
fn strip_storage_letter(code: &str) -> &str {
    let mut chars = code.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() && chars.as_str().starts_with(|c: char| c.is_ascii_digit()) => {
            chars.as_str()
        }
        _ => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/home/me/files";

    fn bare(code: &str) -> Identifier {
        Identifier::classify(code, "", "Title")
    }

    // --- Level classification ---

    #[test]
    fn test_every_d0_code_is_an_area() {
        for digit in 1..=9 {
            let code = format!("{}0", digit);
            let id = bare(&code);
            assert_eq!(id.level, IdLevel::Area, "code {}", code);
            assert_eq!(id.ancestor_code(IdLevel::Area).unwrap(), code);
        }
    }

    #[test]
    fn test_two_digit_code_is_a_category() {
        let id = bare("21");
        assert_eq!(id.level, IdLevel::Category);
        assert_eq!(id.ancestor_code(IdLevel::Area).unwrap(), "20");
        assert_eq!(id.ancestor_code(IdLevel::Category).unwrap(), "21");
    }

    #[test]
    fn test_single_dot_with_numeric_tail_is_a_subfolder() {
        for code in ["21.01", "21.99", "35.10", "9.42"] {
            assert_eq!(bare(code).level, IdLevel::Subfolder, "code {}", code);
        }
    }

    #[test]
    fn test_subfolder_with_characters_is_invalid() {
        let id = bare("21.0a");
        assert_eq!(id.level, IdLevel::Invalid);
        assert_eq!(id.descriptor, "The Subfolder ID contains characters");
    }

    #[test]
    fn test_numeric_project_suffix_is_a_project() {
        let id = bare("21.01.03");
        assert_eq!(id.level, IdLevel::Project);
        assert_eq!(id.revision, None);
        assert_eq!(id.revision_stage, DEFAULT_REVISION_STAGE);
        assert_eq!(id.ancestor_code(IdLevel::Subfolder).unwrap(), "21.01");
    }

    #[test]
    fn test_two_digit_project_suffix_stays_a_project() {
        // A fully numeric suffix is never read as a stage + revision.
        let id = bare("21.01.12");
        assert_eq!(id.level, IdLevel::Project);
        assert_eq!(id.revision, None);
    }

    #[test]
    fn test_stage_letter_and_digit_make_a_child_project() {
        let id = bare("21.01.03B2");
        assert_eq!(id.level, IdLevel::ChildProject);
        assert_eq!(id.revision_stage, 'B');
        assert_eq!(id.revision, Some(2));
        assert_eq!(id.parent_project_code(), Some("21.01.03"));
        assert_eq!(id.ancestor_code(IdLevel::Project).unwrap(), "21.01.03");
    }

    #[test]
    fn test_malformed_revision_is_invalid() {
        for code in ["21.01.031A", "21.01.03AB", "21.01.A"] {
            let id = bare(code);
            assert_eq!(id.level, IdLevel::Invalid, "code {}", code);
            assert!(id.descriptor.contains("Revision Letter"));
        }
    }

    #[test]
    fn test_missing_area_or_category_digit_is_invalid() {
        let id = bare("2x");
        assert_eq!(id.level, IdLevel::Invalid);
        assert!(id.descriptor.contains("Category"));

        let id = bare("Bxy");
        assert_eq!(id.level, IdLevel::Invalid);
        assert!(id.descriptor.contains("Area"));
    }

    #[test]
    fn test_short_codes_are_invalid() {
        assert_eq!(bare("2").descriptor, "ID is too short");
        assert_eq!(bare("").descriptor, "ID is too short");
        // The storage letter leaves a single digit behind.
        assert_eq!(bare("B2").level, IdLevel::Invalid);
    }

    // --- Storage letters ---

    #[test]
    fn test_leading_letter_selects_storage_location() {
        let id = bare("B21.01");
        assert_eq!(id.storage_location, 'B');
        assert_eq!(id.numeric_code, "21.01");
        assert_eq!(id.raw_text, "B21.01");
        assert_eq!(id.level, IdLevel::Subfolder);

        let id = bare("21.01");
        assert_eq!(id.storage_location, PRIMARY_STORAGE);
        assert_eq!(id.numeric_code, "21.01");
    }

    // --- Path cross-check ---

    #[test]
    fn test_matching_path_keeps_identifier_valid() {
        let path = format!("{}/20 - Work/21 - Clients/21.01 - Acme/21.01.03 - Website", ROOT);
        let id = Identifier::classify("21.01.03", &path, "Website");
        assert_eq!(id.level, IdLevel::Project);
        assert_eq!(id.descriptor, "Website");
    }

    #[test]
    fn test_child_project_revision_folder_is_not_cross_checked() {
        let path = format!(
            "{}/20 - Work/21 - Clients/21.01 - Acme/21.01.03 - Website/B2 - Launch",
            ROOT
        );
        let id = Identifier::classify("21.01.03B2", &path, "Launch");
        assert_eq!(id.level, IdLevel::ChildProject);
    }

    #[test]
    fn test_path_mismatch_names_both_codes() {
        let path = format!("{}/20 - Work/21 - Clients/21.02 - Something/21.01.03 - Website", ROOT);
        let id = Identifier::classify("21.01.03", &path, "Website");
        assert_eq!(id.level, IdLevel::Invalid);
        assert!(id.descriptor.contains("21.01"), "{}", id.descriptor);
        assert!(id.descriptor.contains("21.02"), "{}", id.descriptor);
        assert_eq!(id.claimed_level(), Some(IdLevel::Project));
    }

    #[test]
    fn test_code_deeper_in_path_than_its_level_is_invalid() {
        let path = format!("{}/20 - Work/22 - Admin/22 - Stray", ROOT);
        let id = Identifier::classify("22", &path, "Stray");
        assert_eq!(id.level, IdLevel::Invalid);
        assert!(id.descriptor.contains("subfolder level"), "{}", id.descriptor);
    }

    #[test]
    fn test_deeper_titled_folder_names_both_codes() {
        let path = format!("{}/20 - Work/21 - Clients/21.01 - Acme/21.02 - Something", ROOT);
        let id = Identifier::classify("21.01", &path, "Something");
        assert_eq!(id.level, IdLevel::Invalid);
        assert!(id.descriptor.contains("21.01"), "{}", id.descriptor);
        assert!(id.descriptor.contains("21.02"), "{}", id.descriptor);
        assert!(id.descriptor.contains("project level"), "{}", id.descriptor);
    }

    #[test]
    fn test_lowercase_storage_letter_is_normalised() {
        let id = Identifier::classify("b21.01", "", "Acme");
        assert_eq!(id.raw_text, "B21.01");
        assert_eq!(id.storage_location, 'B');
        assert_eq!(id.level, IdLevel::Subfolder);
        assert_eq!(normalize_code(" 21.01 "), "21.01");
    }

    #[test]
    fn test_folder_names_need_exactly_one_separator() {
        assert_eq!(split_folder_name("21 - Clients"), Some(("21", "Clients")));
        assert_eq!(split_folder_name("21 Clients"), None);
        assert_eq!(split_folder_name("21 - Clients - Old"), None);
    }

    #[test]
    fn test_secondary_storage_folders_carry_their_letter() {
        let path = "/mnt/archive/B20 - Work/B21 - Clients";
        let id = Identifier::classify("B21", path, "Clients");
        assert_eq!(id.level, IdLevel::Category);
        assert_eq!(id.storage_location, 'B');
    }

    #[test]
    fn test_windows_paths_are_canonicalised() {
        let id = Identifier::classify("20", r"C:\files\20 - Work", "Work");
        assert_eq!(id.path, "C:/files/20 - Work");
        assert_eq!(id.level, IdLevel::Area);
    }

    // --- Ancestor codes ---

    #[test]
    fn test_ancestor_deeper_than_own_level_fails() {
        let id = bare("21");
        let result = id.ancestor_code(IdLevel::Project);
        assert!(matches!(result, Err(IdError::InvalidOperation { .. })));
    }

    #[test]
    fn test_ancestor_of_invalid_identifier_fails() {
        let id = bare("21.0a");
        let result = id.ancestor_code(IdLevel::Area);
        assert!(matches!(result, Err(IdError::InvalidOperation { .. })));
    }

    #[test]
    fn test_ancestor_invalid_level_fails() {
        let id = bare("21.01.03B2");
        assert!(id.ancestor_code(IdLevel::Invalid).is_err());
    }

    // --- Parsing user input and cache records ---

    #[test]
    fn test_parse_rejects_invalid_codes() {
        assert!(Identifier::parse(" 21.01 ").is_ok());
        let err = Identifier::parse("21.0a").unwrap_err();
        assert!(matches!(err, IdError::InvalidIdentifier { .. }));
        assert!(err.to_string().contains("21.0a"));
    }

    #[test]
    fn test_record_conversion_preserves_fields() {
        let path = format!("{}/20 - Work/21 - Clients/21.01 - Acme/21.01.03 - Website/B2 - Launch", ROOT);
        let id = Identifier::classify("21.01.03B2", &path, "Launch");
        let record = id.to_record();
        assert_eq!(record.revision_count, 2);
        assert_eq!(record.level, IdLevel::ChildProject);

        let restored = Identifier::from_record(&id.raw_text, &record);
        assert_eq!(restored, id);
    }

    #[test]
    fn test_unassigned_revision_is_minus_one_in_records() {
        let id = bare("21.01.03");
        assert_eq!(id.to_record().revision_count, -1);
        let restored = Identifier::from_record("21.01.03", &id.to_record());
        assert_eq!(restored.revision, None);
    }

    #[test]
    fn test_unparsed_folder_is_invalid_without_code() {
        let id = Identifier::unparsed("/files/Misc", "no discernible ID");
        assert!(!id.is_valid());
        assert_eq!(id.raw_text, "");
        assert_eq!(id.claimed_level(), None);
    }

    #[test]
    fn test_char_prefix_handles_short_and_multibyte_codes() {
        assert_eq!(char_prefix("21.01", 8), "21.01");
        assert_eq!(char_prefix("21.01.03B2", 8), "21.01.03");
        assert_eq!(char_prefix("2é.01", 2), "2é");
    }
}
