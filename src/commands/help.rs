//! Help models and rendering.
//!
//! [`GroupsInfo`] collects visible registrations sorted by group and name; the
//! standard `help` command renders it, or the detail of a single command.

use std::collections::BTreeMap;

use super::catalog::Registrations;
use super::option::{CommandOption, OptionType};
use super::registration::CommandRegistration;

/// One command as listed in help output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: Option<String>,
}

impl CommandInfo {
    fn of(registration: &CommandRegistration) -> Self {
        Self {
            name: registration.name().to_string(),
            description: registration.description().map(String::from),
        }
    }
}

/// Commands of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCommandInfo {
    pub group: String,
    pub commands: Vec<CommandInfo>,
}

/// All visible commands, grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupsInfo {
    pub show_groups: bool,
    pub groups: Vec<GroupCommandInfo>,
    /// Every command of every group, in group order.
    pub commands: Vec<CommandInfo>,
}

impl GroupsInfo {
    /// Collects registrations into groups, sorted by group name then command name.
    /// Hidden commands are left out.
    pub fn of(show_groups: bool, registrations: &Registrations) -> Self {
        let mut by_group: BTreeMap<&str, Vec<CommandInfo>> = BTreeMap::new();
        for registration in registrations.values().filter(|r| !r.is_hidden()) {
            by_group
                .entry(registration.group())
                .or_default()
                .push(CommandInfo::of(registration));
        }

        let groups: Vec<GroupCommandInfo> = by_group
            .into_iter()
            .map(|(group, mut commands)| {
                commands.sort_by(|a, b| a.name.cmp(&b.name));
                GroupCommandInfo {
                    group: group.to_string(),
                    commands,
                }
            })
            .collect();
        let commands = groups.iter().flat_map(|g| g.commands.clone()).collect();

        Self {
            show_groups,
            groups,
            commands,
        }
    }

    /// Renders the listing as text lines.
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec!["AVAILABLE COMMANDS".to_string()];
        if self.show_groups {
            for group in &self.groups {
                lines.push(String::new());
                lines.push(group.group.clone());
                lines.extend(group.commands.iter().map(command_line));
            }
        } else {
            lines.push(String::new());
            lines.extend(self.commands.iter().map(command_line));
        }
        lines
    }
}

fn command_line(info: &CommandInfo) -> String {
    match &info.description {
        Some(description) => format!("       {}: {}", info.name, description),
        None => format!("       {}", info.name),
    }
}

/// Renders the detail page of a single command.
pub fn command_help(registration: &CommandRegistration) -> Vec<String> {
    let mut lines = vec!["NAME".to_string()];
    lines.push(match registration.description() {
        Some(description) => format!("       {} - {}", registration.name(), description),
        None => format!("       {}", registration.name()),
    });

    let synopsis: Vec<String> = std::iter::once(registration.name().to_string())
        .chain(registration.options().iter().map(synopsis_part))
        .collect();
    lines.push(String::new());
    lines.push("SYNOPSIS".to_string());
    lines.push(format!("       {}", synopsis.join(" ")));

    if !registration.options().is_empty() {
        lines.push(String::new());
        lines.push("OPTIONS".to_string());
        for option in registration.options() {
            lines.push(format!("       {} {}", option_names(option), type_label(option)));
            if let Some(description) = option.description() {
                lines.push(format!("       {description}"));
            }
            lines.push(format!("       {}", qualifier(option)));
            lines.push(String::new());
        }
        lines.pop();
    }

    lines.push(String::new());
    lines.push("GROUP".to_string());
    lines.push(format!("       {}", registration.group()));
    lines
}

fn option_names(option: &CommandOption) -> String {
    option
        .long_names()
        .iter()
        .map(|n| format!("--{n}"))
        .chain(option.short_names().iter().map(|c| format!("-{c}")))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn synopsis_part(option: &CommandOption) -> String {
    let names = option_names(option);
    let first = names.split(" or ").next().unwrap_or_default().to_string();
    let part = match option.option_type() {
        OptionType::Boolean => first,
        _ => format!("{} {}", first, type_label(option)),
    };
    if option.is_required() {
        part
    } else {
        format!("[{part}]")
    }
}

fn type_label(option: &CommandOption) -> &'static str {
    match option.option_type() {
        OptionType::String => "String",
        OptionType::Integer => "Integer",
        OptionType::Float => "Float",
        OptionType::Boolean => "Boolean",
        OptionType::Path => "Path",
        OptionType::List => "List",
    }
}

fn qualifier(option: &CommandOption) -> String {
    match (option.is_required(), option.default_value()) {
        (true, _) => "[Mandatory]".to_string(),
        (false, Some(default)) => format!("[Optional, default = {default}]"),
        (false, None) => "[Optional]".to_string(),
    }
}
