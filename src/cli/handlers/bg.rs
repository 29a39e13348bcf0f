// src/cli/handlers/bg.rs

use anyhow::{Context, Result};
use clap::Parser;

use crate::{cli::handlers::commons, core::background, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Rescans the file system and rebuilds the ID cache."
)]
struct BgArgs {
    /// The storage location to rescan. Defaults to the primary location.
    #[arg(long, short)]
    drive: Option<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let bg_args = BgArgs::try_parse_from(&args)?;
    let storage = commons::storage_arg(bg_args.drive.as_deref())?;

    let count = state
        .rescan(storage)
        .with_context(|| format!(t!("bg.error.failed"), storage = storage))?;

    println!(
        t!("bg.success"),
        storage = storage,
        count = count,
        path = background::log_file_path(&state.root).display()
    );
    Ok(())
}
