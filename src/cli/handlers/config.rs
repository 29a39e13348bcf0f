// src/cli/handlers/config.rs

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{core::paths, state::AppState};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Shows the active configuration.")]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Prints the configuration and the resolved root.
    View {
        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let config_args = ConfigArgs::try_parse_from(&args)?;

    match config_args.action {
        ConfigAction::View { json: true } => {
            println!("{}", serde_json::to_string_pretty(&state.config)?);
        }
        ConfigAction::View { json: false } => {
            println!(
                t!("config.view.source"),
                path = paths::get_config_file_path()?.display()
            );
            println!(t!("config.view.root"), path = state.root.display());
            println!("{}", toml::to_string_pretty(&state.config)?);
        }
    }
    Ok(())
}
