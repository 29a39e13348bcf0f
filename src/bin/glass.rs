// src/bin/glass.rs

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use glass::{
    cli::{Cli, dispatcher},
    core::config_loader,
    state::AppState,
};

/// The main entry point of the `glass` application.
/// Sets up logging, parses arguments, dispatches to the command handler and
/// reports any error on stderr.
fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        // Handler argument errors, including `<command> --help`, are
        // reported by clap itself.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("{}: {:#}", glass::t!("common.error.prefix"), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    if cli.args.is_empty() {
        Cli::command().print_help()?;
        return Ok(());
    }

    let loaded = config_loader::load_config().context(glass::t!("bin.error.config"))?;
    let command_line = std::env::args().collect::<Vec<_>>().join(" ");
    let mut state = AppState::load(loaded, command_line)?;

    dispatcher::dispatch(cli.args, &mut state)?;

    if state.needs_saving() {
        state
            .persist()
            .context(glass::t!("bin.error.save_drives"))?;
    }
    Ok(())
}
