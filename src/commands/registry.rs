use super::{CommandContext, CommandResult};

pub type CommandHandler = fn(&mut CommandContext<'_>, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usages: &'static [CommandUsage],
    pub handler: CommandHandler,
}

pub struct CommandUsage {
    pub syntax: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// Whitespace-separated argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.split_whitespace().nth(index)
    }

    /// Split off the first argument; the remainder is trimmed.
    pub fn split_first(&self) -> (Option<&'a str>, &'a str) {
        match self.args.split_once(char::is_whitespace) {
            Some((first, rest)) => (Some(first), rest.trim()),
            None if self.args.is_empty() => (None, ""),
            None => (Some(self.args), ""),
        }
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

/// Look up a command by name or alias, ignoring case.
pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands().iter().find(|command| {
        command.name.eq_ignore_ascii_case(name)
            || command
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        aliases: &["h"],
        usages: &[CommandUsage {
            syntax: "/help",
            description: "Show this menu",
        }],
        handler: super::handlers::core::handle_help,
    },
    Command {
        name: "clear",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/clear",
            description: "Reset conversation context",
        }],
        handler: super::handlers::core::handle_clear,
    },
    Command {
        name: "exit",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/exit",
            description: "Quit application",
        }],
        handler: super::handlers::core::handle_exit,
    },
    Command {
        name: "code",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/code <lang>",
            description: "Enter multi-line code mode (finish with /end)",
        }],
        handler: super::handlers::core::handle_code,
    },
    Command {
        name: "copy",
        aliases: &[],
        usages: &[CommandUsage {
            syntax: "/copy <num>",
            description: "Copy AI code block by number",
        }],
        handler: super::handlers::core::handle_copy,
    },
    Command {
        name: "file",
        aliases: &["f"],
        usages: &[
            CommandUsage {
                syntax: "/file <path>",
                description: "Send file to AI",
            },
            CommandUsage {
                syntax: "/file --summary <path>",
                description: "Get concise summary",
            },
            CommandUsage {
                syntax: "/file --explain <path>",
                description: "Detailed explanation",
            },
            CommandUsage {
                syntax: "/file --refactor <path>",
                description: "Improve and return full code",
            },
        ],
        handler: super::handlers::io::handle_file,
    },
    Command {
        name: "project",
        aliases: &["p"],
        usages: &[
            CommandUsage {
                syntax: "/project add <folder>",
                description: "Index project directory",
            },
            CommandUsage {
                syntax: "/project list",
                description: "Show indexed files",
            },
            CommandUsage {
                syntax: "/project remove",
                description: "Unload project",
            },
            CommandUsage {
                syntax: "/project ask <question>",
                description: "Ask question about project",
            },
        ],
        handler: super::handlers::project::handle_project,
    },
];
