use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Open a link from the latest reply
    Open,
    /// Show help
    Help,
    /// Exit the application
    Bye,
}

pub fn command_entries() -> Vec<CommandEntry> {
    SlashCommand::iter()
        .map(|command| CommandEntry {
            command,
            keyword: command.command(),
            description: command.description(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: SlashCommand,
    pub argument: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: SlashCommand,
    pub keyword: &'static str,
    pub description: &'static str,
}

impl ParsedCommand {
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// 1-based link number for `/open`, defaulting to the first link
    pub fn link_number(&self) -> Option<usize> {
        if self.command != SlashCommand::Open {
            return None;
        }

        match self.argument() {
            None => Some(1),
            Some(arg) => arg
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0),
        }
    }
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Open => "open link <n> of the latest reply in your browser",
            SlashCommand::Help => "show available commands",
            SlashCommand::Bye => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input.
///
/// Unknown commands return `None` and are sent as ordinary text.
pub fn parse_slash_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?;
    let tail: Vec<&str> = parts.collect();

    let command = SlashCommand::from_str(&head.to_lowercase()).ok().or_else(|| {
        match head.to_lowercase().as_str() {
            "q" | "quit" | "exit" => Some(SlashCommand::Bye),
            "o" | "link" => Some(SlashCommand::Open),
            "h" | "?" => Some(SlashCommand::Help),
            _ => None,
        }
    })?;

    let argument = if tail.is_empty() {
        None
    } else {
        Some(tail.join(" "))
    };

    Some(ParsedCommand { command, argument })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Commands: ");
    let entries: Vec<String> = command_entries()
        .iter()
        .map(|entry| format!("/{} {}", entry.keyword, entry.description))
        .collect();
    help.push_str(&entries.join(" · "));
    help.push_str(" · Enter sends, Shift+Enter adds a line, Esc quits");
    help
}
