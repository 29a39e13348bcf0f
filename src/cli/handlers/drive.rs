// src/cli/handlers/drive.rs

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    core::drive_manager::{self, DriveField},
    state::AppState,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manages the registered storage drives.")]
struct DriveArgs {
    #[command(subcommand)]
    action: DriveAction,
}

#[derive(Subcommand, Debug)]
enum DriveAction {
    /// Registers a new drive.
    New {
        /// A single letter; A is the primary location.
        letter: String,
        label: String,
        /// Where the drive's hierarchy root is mounted.
        path: String,
    },
    /// Changes the label or path of a drive.
    Modify {
        letter: String,
        /// `label` or `path`.
        field: DriveField,
        value: String,
    },
    /// Lists the registered drives.
    View,
    /// Reports ID caches that belong to no registered drive.
    Check,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let drive_args = DriveArgs::try_parse_from(&args)?;

    match drive_args.action {
        DriveAction::New {
            letter,
            label,
            path,
        } => {
            let letter = drive_manager::add_drive(state.drives_mut(), &letter, &label, &path)?;
            println!(t!("drive.new.success"), letter = letter, label = label);
        }
        DriveAction::Modify {
            letter,
            field,
            value,
        } => {
            drive_manager::modify_drive(state.drives_mut(), &letter, field, &value)?;
            println!(t!("drive.modify.success"), letter = letter.to_uppercase());
        }
        DriveAction::View => print_drives(state),
        DriveAction::Check => {
            let unregistered = drive_manager::check_drives(&state.root, state.drives())?;
            if unregistered.is_empty() {
                println!("{}", t!("drive.check.ok"));
            }
            for letter in unregistered {
                println!(t!("drive.check.unregistered"), letter = letter);
            }
        }
    }
    Ok(())
}

fn print_drives(state: &AppState) {
    let drives = &state.drives().drives;
    if drives.is_empty() {
        println!("{}", t!("drive.view.empty"));
        return;
    }
    println!(
        "{:<10} | {:<20} | {:<20}",
        t!("drive.label.letter"),
        t!("drive.label.label"),
        t!("drive.label.path")
    );
    println!("{}|{}|{}", "-".repeat(11), "-".repeat(22), "-".repeat(21));
    for drive in drives {
        println!("{:<10} | {:<20} | {:<20}", drive.letter, drive.label, drive.path);
    }
}
