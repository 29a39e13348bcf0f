// src/core/revisions.rs

//! # Revision Aggregator
//!
//! A project folder carries no revision of its own; it takes the stage and
//! number of its most advanced child-project.

use crate::core::identifier::Identifier;
use crate::models::IdLevel;

/// Assigns every unassigned project the revision of the descendant with the
/// greatest numeric code. Projects with no revised descendants keep their
/// default stage and stay unassigned.
pub fn assign_revisions(ids: &mut [Identifier]) {
    for index in 0..ids.len() {
        let Some(project) = ids.get(index) else {
            continue;
        };
        if project.level != IdLevel::Project || project.revision.is_some() {
            continue;
        }

        let project_code = project.numeric_code.trim();
        let latest = ids
            .iter()
            .filter(|candidate| candidate.revision.is_some())
            .filter(|candidate| {
                candidate
                    .ancestor_code(IdLevel::Project)
                    .is_ok_and(|code| code == project_code)
            })
            .max_by(|a, b| a.numeric_code.cmp(&b.numeric_code))
            .map(|latest| (latest.revision_stage, latest.revision));

        if let (Some((stage, revision)), Some(project)) = (latest, ids.get_mut(index)) {
            log::debug!(
                "Project {} is at revision {}{}",
                project.raw_text,
                stage,
                revision.unwrap_or_default()
            );
            project.revision_stage = stage;
            project.revision = revision;
        }
    }
}
