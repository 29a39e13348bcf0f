// src/core/graph_display.rs

use crate::core::cache_store::IdCache;
use crate::core::identifier::Identifier;
use crate::models::IdLevel;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

/// Options of the ASCII tree view.
#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    /// Show only the subtree of this code.
    pub start: Option<String>,
    /// Deepest level shown.
    pub max_level: Option<IdLevel>,
    /// Append each folder's path.
    pub show_paths: bool,
}

/// Maps every identifier to its children, keyed by the parent's raw code
/// (`None` for top-level entries). A node's parent is its nearest ancestor
/// that exists in the cache.
fn build_children_map(cache: &IdCache) -> HashMap<Option<&str>, Vec<&Identifier>> {
    let mut children_map: HashMap<Option<&str>, Vec<&Identifier>> = HashMap::new();
    for id in cache.sorted() {
        children_map.entry(parent_code(cache, id)).or_default().push(id);
    }
    children_map
}

/// The raw code of the nearest cached ancestor of `id`.
fn parent_code<'a>(cache: &'a IdCache, id: &Identifier) -> Option<&'a str> {
    let prefix: String = id.raw_text.chars().take_while(|c| !c.is_ascii_digit()).collect();
    let mut level = id.level.parent();
    while let Some(current) = level {
        if let Ok(code) = id.ancestor_code(current) {
            let key = format!("{}{}", prefix, code);
            if let Some((stored, _)) = cache.ids.get_key_value(&key) {
                return Some(stored.as_str());
            }
        }
        level = current.parent();
    }
    None
}

/// Renders the cached hierarchy as an ASCII tree.
pub fn render_tree(cache: &IdCache, options: &DisplayOptions) -> String {
    let mut out = String::new();
    if cache.is_empty() {
        return out;
    }
    let children_map = build_children_map(cache);

    match options.start.as_deref() {
        Some(start) => {
            let Some(start_id) = cache.get(start) else {
                return out;
            };
            let _ = writeln!(out, "{}", node_label(start_id, options));
            write_children(&mut out, Some(start), &children_map, options, "");
        }
        None => write_children(&mut out, None, &children_map, options, ""),
    }
    out
}

fn node_label(id: &Identifier, options: &DisplayOptions) -> String {
    let mut label = format!("{} - {}", id.raw_text, id.descriptor);
    if let (IdLevel::Project, Some(revision)) = (id.level, id.revision) {
        let _ = write!(label, " ({}{})", id.revision_stage, revision);
    }
    if options.show_paths {
        let _ = write!(label, " [{}]", id.path);
    }
    label
}

/// Recursively writes the children of `parent` and their descendants.
fn write_children(
    out: &mut String,
    parent: Option<&str>,
    children_map: &HashMap<Option<&str>, Vec<&Identifier>>,
    options: &DisplayOptions,
    prefix: &str,
) {
    let Some(children) = children_map.get(&parent) else {
        return;
    };
    let visible: Vec<&&Identifier> = children
        .iter()
        .filter(|id| options.max_level.is_none_or(|max| id.level <= max))
        .collect();

    for (i, child) in visible.iter().enumerate() {
        let is_last = i + 1 == visible.len();
        let connector = if is_last { "└─" } else { "├─" };
        let _ = writeln!(out, "{}{}{}", prefix, connector, node_label(child, options));

        let child_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        write_children(
            out,
            Some(child.raw_text.as_str()),
            children_map,
            options,
            &child_prefix,
        );
    }
}

/// Renders the area/category/subfolder levels (and projects, if asked) as a
/// Mermaid `graph TD` diagram. Edges run from each node to its nearest cached
/// ancestor.
pub fn render_mermaid(cache: &IdCache, include_projects: bool) -> String {
    let deepest = if include_projects {
        IdLevel::Project
    } else {
        IdLevel::Subfolder
    };
    let nodes: Vec<&Identifier> = cache
        .sorted()
        .into_iter()
        .filter(|id| id.is_valid() && id.level <= deepest)
        .collect();

    let node_names: BTreeMap<&str, String> = nodes
        .iter()
        .enumerate()
        .map(|(i, id)| (id.raw_text.as_str(), format!("N{}", i)))
        .collect();

    let mut out = String::from("graph TD;\n");
    for id in &nodes {
        let Some(name) = node_names.get(id.raw_text.as_str()) else {
            continue;
        };
        let label = format!("{} - {}", id.raw_text, id.descriptor).replace('"', "'");
        let _ = writeln!(out, "    {}[\"{}\"];", name, label);
    }
    for id in &nodes {
        let parent = parent_code(cache, id).and_then(|code| node_names.get(code));
        if let (Some(parent), Some(name)) = (parent, node_names.get(id.raw_text.as_str())) {
            let _ = writeln!(out, "    {} --> {};", parent, name);
        }
    }
    out
}

/// Human-readable details of one identifier.
///
/// `storage_label` is the registered name of its storage location and
/// `revision_label` the display name of its revision stage.
pub fn render_info(id: &Identifier, storage_label: Option<&str>, revision_label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", id.raw_text);
    let _ = writeln!(out, "Desc: {}", id.descriptor);
    let _ = writeln!(out, "Type: {}", id.level);
    if !id.is_valid() {
        return out;
    }
    let _ = writeln!(
        out,
        "Stored: {}",
        storage_label.unwrap_or("UNREGISTERED DRIVE")
    );
    let _ = writeln!(out, "Path: {}", id.path);
    if matches!(id.level, IdLevel::Project | IdLevel::ChildProject) {
        let _ = writeln!(out, "Revision-Stage: {}", revision_label);
        match id.revision {
            Some(revision) => {
                let _ = writeln!(out, "Revision: {}", revision);
            }
            None => {
                let _ = writeln!(out, "Revision: none");
            }
        }
    }
    out
}
