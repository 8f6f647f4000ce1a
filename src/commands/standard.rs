//! Built-in commands (`help`, `quit`/`exit`).

use anyhow::bail;

use super::help::{command_help, GroupsInfo};
use super::option::OptionType;
use super::output::CommandOutput;
use super::registration::CommandRegistration;
use crate::error::Result;

/// Group the built-in commands are listed under.
pub const BUILT_IN_GROUP: &str = "Built-In Commands";

/// Returns every built-in registration.
pub fn standard_commands(show_groups: bool) -> Result<Vec<CommandRegistration>> {
    Ok(vec![help(show_groups)?, quit("quit")?, quit("exit")?])
}

/// `help [command...]`: lists commands, or details the named one.
pub fn help(show_groups: bool) -> Result<CommandRegistration> {
    CommandRegistration::builder()
        .command("help")
        .description("Display help about available commands")
        .group(BUILT_IN_GROUP)
        .option(|o| {
            o.long_names(["command"])
                .short_names(['C'])
                .description("The command to obtain help for")
                .option_type(OptionType::List)
                .position(0)
        })
        .target(move |ctx| {
            let words = ctx.arguments.get_list("command").unwrap_or_default();
            if words.is_empty() {
                return Ok(CommandOutput::Lines(
                    GroupsInfo::of(show_groups, ctx.registrations).render(),
                ));
            }

            let name = words.join(" ");
            match ctx.registrations.get(&name) {
                Some(registration) => Ok(CommandOutput::Lines(command_help(registration))),
                None => bail!("Unknown command '{name}'"),
            }
        })
        .build()
}

/// `quit` / `exit`: asks the result handler to leave the shell.
pub fn quit(name: &str) -> Result<CommandRegistration> {
    CommandRegistration::builder()
        .command(name)
        .description("Exit the shell")
        .group(BUILT_IN_GROUP)
        .target(|_ctx| Ok(CommandOutput::exit()))
        .build()
}
