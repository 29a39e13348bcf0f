// src/cli/handlers/diagram.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, core::graph_display, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints a Mermaid.js diagram of the file tree."
)]
struct DiagramArgs {
    /// Include project-level IDs.
    #[arg(long)]
    projects: bool,

    /// The storage location to draw. Defaults to the primary location.
    #[arg(long)]
    drive: Option<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let diagram_args = DiagramArgs::try_parse_from(&args)?;
    let storage = commons::storage_arg(diagram_args.drive.as_deref())?;
    let cache = state.cache(storage)?;
    print!(
        "{}",
        graph_display::render_mermaid(cache, diagram_args.projects)
    );
    Ok(())
}
