// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use crate::{
    cli::handlers::commons,
    core::graph_display::{self, DisplayOptions},
    core::identifier::Identifier,
    core::storage_router,
    models::IdLevel,
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the cached IDs as a tree.")]
struct ListArgs {
    /// Only show the subtree below this ID.
    id: Option<String>,

    /// The storage location to list. Defaults to the primary location.
    #[arg(long)]
    drive: Option<String>,

    /// Show each folder's path.
    #[arg(long, short)]
    paths: bool,

    /// Deepest level to show (area, category, subfolder, project).
    #[arg(long, value_parser = parse_level)]
    depth: Option<IdLevel>,

    /// Print the IDs as JSON instead of a tree.
    #[arg(long)]
    json: bool,

    /// Print only the `<code> - <title>` of each ID.
    #[arg(long, short, conflicts_with = "json")]
    quiet: bool,
}

#[derive(Serialize)]
struct ListedId<'a> {
    id: &'a str,
    title: &'a str,
    level: IdLevel,
    path: &'a str,
}

fn parse_level(text: &str) -> Result<IdLevel, String> {
    IdLevel::HIERARCHY
        .into_iter()
        .find(|level| level.as_str() == text.to_lowercase())
        .ok_or_else(|| format!("unknown level '{}'", text))
}

/// `--drive` when given, otherwise the storage of the start ID.
fn list_storage(id: Option<&str>, drive: Option<&str>) -> Result<char> {
    match (id, drive) {
        (Some(code), None) => Ok(storage_router::storage_of(code)),
        (_, drive) => commons::storage_arg(drive),
    }
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let storage = list_storage(list_args.id.as_deref(), list_args.drive.as_deref())?;

    // Fail early, with a rescan, if the start ID is unknown.
    let start = match &list_args.id {
        Some(code) => Some(commons::require_id(state, code)?.raw_text),
        None => None,
    };
    let cache = state.cache(storage)?;

    if cache.is_empty() {
        println!("{}", t!("list.empty"));
        return Ok(());
    }

    let ids: Vec<&Identifier> = cache.sorted();
    if list_args.json {
        let listed: Vec<ListedId<'_>> = ids
            .iter()
            .map(|id| ListedId {
                id: &id.raw_text,
                title: &id.descriptor,
                level: id.level,
                path: &id.path,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }
    if list_args.quiet {
        for id in ids {
            println!("{} - {}", id.raw_text, id.descriptor);
        }
        return Ok(());
    }

    let options = DisplayOptions {
        start,
        max_level: list_args.depth,
        show_paths: list_args.paths,
    };
    println!(t!("list.header"), count = cache.len(), storage = storage);
    print!("{}", graph_display::render_tree(cache, &options));
    Ok(())
}
