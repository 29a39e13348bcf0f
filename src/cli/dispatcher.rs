// src/cli/dispatcher.rs

use anyhow::{Result, anyhow};

use crate::{cli::handlers, state::AppState};

/// A command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppState) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "backup",
        aliases: &[],
        handler: handlers::backup::handle,
    },
    CommandDefinition {
        name: "bg",
        aliases: &["rescan"],
        handler: handlers::bg::handle,
    },
    CommandDefinition {
        name: "config",
        aliases: &[],
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "diagram",
        aliases: &[],
        handler: handlers::diagram::handle,
    },
    CommandDefinition {
        name: "drive",
        aliases: &[],
        handler: handlers::drive::handle,
    },
    CommandDefinition {
        name: "info",
        aliases: &[],
        handler: handlers::info::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "path",
        aliases: &[],
        handler: handlers::path::handle,
    },
    CommandDefinition {
        name: "standin",
        aliases: &[],
        handler: handlers::standin::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `args` (command name first) to its handler.
pub fn dispatch(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let mut args = args.into_iter();
    let Some(command_name) = args.next() else {
        return Err(anyhow!(t!("dispatch.error.no_command")));
    };

    let command = find_command(&command_name).ok_or_else(|| {
        anyhow!(format!(
            t!("dispatch.error.unknown_command"),
            name = command_name
        ))
    })?;
    log::debug!("Dispatching '{}'", command.name);
    (command.handler)(args.collect(), state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_resolve_by_name_and_alias() {
        assert_eq!(find_command("list").map(|c| c.name), Some("list"));
        assert_eq!(find_command("ls").map(|c| c.name), Some("list"));
        assert!(find_command("standin").is_some());
        assert!(find_command("launch").is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<&str> = COMMAND_REGISTRY
            .iter()
            .flat_map(|c| std::iter::once(c.name).chain(c.aliases.iter().copied()))
            .collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
