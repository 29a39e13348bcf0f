// src/cli/handlers/backup.rs

use anyhow::Result;
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};

use crate::{
    cli::handlers::commons,
    constants::PRIMARY_STORAGE,
    core::{
        backup::{self, EncodeOptions},
        clock,
        identifier::Identifier,
    },
    state::AppState,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Tracks backups of the file system.")]
struct BackupArgs {
    #[command(subcommand)]
    action: BackupAction,
}

#[derive(Subcommand, Debug)]
enum BackupAction {
    /// Writes a fingerprint of the current hierarchy before copying it.
    Encode {
        /// The drive the backup will be stored on.
        #[arg(long)]
        drive: Option<String>,
        /// Do not keep a dated copy under `.glass/backups/`.
        #[arg(long)]
        single: bool,
        /// Replace a dated copy written earlier today.
        #[arg(long)]
        force: bool,
    },
    /// Lists the backups tracked locally.
    View,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let backup_args = BackupArgs::try_parse_from(&args)?;

    match backup_args.action {
        BackupAction::Encode {
            drive,
            single,
            force,
        } => {
            let drive = commons::storage_arg(drive.as_deref())?;
            let root = state.root.clone();
            let cache = state.cache(PRIMARY_STORAGE)?;
            let ids: Vec<&Identifier> = cache.sorted();
            let options = EncodeOptions {
                drive,
                single,
                force,
            };
            let encoded = backup::encode_backup(&root, &ids, options, &clock::local_date())?;

            println!(
                t!("backup.encode.success"),
                path = encoded.identifier_path.display()
            );
            if let Some(dated) = &encoded.dated_path {
                println!(t!("backup.encode.dated"), path = dated.display());
            }
            println!(t!("backup.encode.next"), drive = drive);
        }
        BackupAction::View => print_backups(state)?,
    }
    Ok(())
}

fn print_backups(state: &AppState) -> Result<()> {
    let backups = backup::list_backups(&state.root)?;
    println!(t!("backup.view.header"), count = backups.len());
    if backups.is_empty() {
        return Ok(());
    }

    println!(
        "{:<6} | {:<20} | {:<17} | {:<8} | {}",
        t!("backup.label.drive"),
        t!("backup.label.drive_name"),
        t!("backup.label.date"),
        t!("backup.label.ids"),
        t!("backup.label.path")
    );
    for (path, record) in backups {
        let label = state
            .drives()
            .label_of(record.drive)
            .unwrap_or(t!("backup.view.unregistered"));
        println!(
            "{:<6} | {:<20} | {:<17} | {:<8} | {}",
            record.drive,
            label,
            format_generated(record.generated),
            record.id_count,
            path.display()
        );
    }
    Ok(())
}

/// `HH:MM DD/MM/YYYY` in local time.
fn format_generated(generated: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let micros = (generated * 1_000_000.0) as i64;
    DateTime::from_timestamp_micros(micros)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M %d/%m/%Y").to_string())
        .unwrap_or_default()
}
