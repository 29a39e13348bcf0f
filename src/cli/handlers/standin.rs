// src/cli/handlers/standin.rs

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::{
    cli::handlers::commons,
    core::standin::{self, StandInField},
    models::People,
    state::AppState,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manages stand-in files.")]
struct StandInArgs {
    #[command(subcommand)]
    action: StandInAction,
}

#[derive(Subcommand, Debug)]
enum StandInAction {
    /// Creates a stand-in inside the folder of an ID.
    New {
        /// The ID whose folder receives the stand-in.
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// The URL or path the stand-in points to.
        #[arg(long, alias = "path")]
        url: String,
        /// Comma separated names.
        #[arg(long, default_value = "me")]
        people: String,
    },
    /// Lists the stand-ins inside the folder of an ID.
    View {
        id: String,
    },
    /// Changes one field of a stand-in.
    Modify {
        /// The ID whose folder holds the stand-in.
        id: String,
        /// The current title of the stand-in.
        title: String,
        /// `title`, `description`, `url` or `people`.
        field: StandInField,
        value: String,
    },
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let standin_args = StandInArgs::try_parse_from(&args)?;

    match standin_args.action {
        StandInAction::New {
            id,
            title,
            description,
            url,
            people,
        } => {
            let folder = commons::require_id(state, &id)?.fs_path();
            let created = standin::create_standin(
                &folder,
                &title,
                &description,
                &url,
                People::from_list(&people),
            )?;
            println!(
                t!("standin.new.success"),
                path = created.file_path.display()
            );
        }
        StandInAction::View { id } => {
            let folder = commons::require_id(state, &id)?.fs_path();
            print_standins(&folder)?;
        }
        StandInAction::Modify {
            id,
            title,
            field,
            value,
        } => {
            let folder = commons::require_id(state, &id)?.fs_path();
            let target = find_by_title(&folder, &title)?;
            let updated = standin::modify_standin(&target, field, &value)?;
            println!(
                t!("standin.modify.success"),
                path = updated.file_path.display()
            );
        }
    }
    Ok(())
}

fn find_by_title(folder: &Path, title: &str) -> Result<PathBuf> {
    standin::list_standins(folder)?
        .into_iter()
        .find(|s| s.data.title == title)
        .map(|s| s.file_path)
        .ok_or_else(|| {
            anyhow!(format!(
                t!("standin.error.not_found"),
                title = title,
                path = folder.display()
            ))
        })
}

fn print_standins(folder: &Path) -> Result<()> {
    let standins = standin::list_standins(folder)?;
    if standins.is_empty() {
        println!(t!("standin.view.empty"), path = folder.display());
        return Ok(());
    }
    for s in standins {
        println!("{}", s.data.title);
        println!("  {:<12} {}", t!("standin.label.description"), s.data.description);
        println!("  {:<12} {}", t!("standin.label.url"), s.data.url);
        println!("  {:<12} {}", t!("standin.label.people"), s.data.people.names().join(", "));
        println!("  {:<12} {}", t!("standin.label.file"), s.file_path.display());
    }
    Ok(())
}
