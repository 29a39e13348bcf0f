// src/cli/handlers/path.rs

use anyhow::Result;
use clap::Parser;

use crate::{cli::handlers::commons, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the folder an ID resolves to, for use in scripts (`cd $(glass path 21.01)`)."
)]
struct PathArgs {
    /// The ID to resolve.
    id: String,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let path_args = PathArgs::try_parse_from(&args)?;
    let id = commons::require_id(state, &path_args.id)?;
    println!("{}", id.fs_path().display());
    Ok(())
}
