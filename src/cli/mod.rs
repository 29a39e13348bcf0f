// src/cli/mod.rs

use clap::Parser;

pub mod dispatcher;
pub mod handlers;

/// glass: find any folder of an ID-organised file tree by its ID.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    // The whole help text comes from the locale files.
    help_template = t!("cli.help.template"),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The command followed by its own arguments. Each handler parses the
    /// rest with its own parser.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
