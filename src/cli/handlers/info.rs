// src/cli/handlers/info.rs

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::handlers::commons,
    core::{graph_display, standin},
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Displays the details of an ID.")]
struct InfoArgs {
    /// The ID to describe, e.g. 21.01 or B21.01.
    id: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let info_args = InfoArgs::try_parse_from(&args)?;
    let id = commons::require_id(state, &info_args.id)?;

    let storage_label = state.drives().label_of(id.storage_location.to_ascii_uppercase());
    let revision_label = state.config.revision_label(id.revision_stage);
    print!(
        "{}",
        graph_display::render_info(&id, storage_label, &revision_label)
    );

    // Stand-ins are a convenience; an unreadable folder is not an error here.
    match standin::list_standins(&id.fs_path()) {
        Ok(standins) if !standins.is_empty() => {
            println!("{}", t!("info.label.standins"));
            for s in standins {
                println!("  - {} ({})", s.data.title, s.data.url);
            }
        }
        Ok(_) => {}
        Err(e) => log::warn!("{}", e),
    }
    Ok(())
}
