// src/cli/handlers/commons.rs

// Shared helpers for the command handlers.

use anyhow::Result;

use crate::{core::identifier::Identifier, state::AppState};

/// Finds `code`, rescanning once on a miss, with the code in the error chain.
pub fn require_id(state: &mut AppState, code: &str) -> Result<Identifier> {
    state
        .find_id(code)
        .map_err(|e| anyhow::Error::new(e).context(format!(t!("common.error.lookup"), code = code)))
}

/// Parses a storage letter argument, defaulting to the primary location.
pub fn storage_arg(letter: Option<&str>) -> Result<char> {
    match letter {
        Some(text) => Ok(crate::core::drive_manager::parse_letter(text)?),
        None => Ok(crate::constants::PRIMARY_STORAGE),
    }
}
