//! Slash commands typed at the chat prompt.

mod handlers;
mod registry;

pub use handlers::core::compose_code_message;
pub use handlers::io::{compose_file_message, FileMode};
pub use registry::{all_commands, find_command, Command, CommandInvocation, CommandUsage};

use crate::core::config::Config;
use crate::core::session::ChatSession;

pub enum CommandResult {
    Continue,
    Exit,
    /// Send this text to the model as the user's turn.
    SendMessage(String),
    /// Collect lines until `/end`, then send them as a fenced block.
    StartCodeMode { language: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A line of feedback for the user, printed by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

pub struct CommandContext<'a> {
    pub session: &'a mut ChatSession,
    pub config: &'a Config,
    pub notices: Vec<Notice>,
}

impl<'a> CommandContext<'a> {
    pub fn new(session: &'a mut ChatSession, config: &'a Config) -> Self {
        Self {
            session,
            config,
            notices: Vec::new(),
        }
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Success, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Error, text);
    }
}

/// Dispatch a line of user input. Anything that is not a known command is
/// sent to the model unchanged.
pub fn process_input(ctx: &mut CommandContext<'_>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::SendMessage(trimmed.to_string());
    };

    let (command_name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    if command_name.is_empty() {
        return CommandResult::SendMessage(trimmed.to_string());
    }

    match registry::find_command(command_name) {
        Some(command) => {
            tracing::debug!(command = command.name, "Running command");
            let invocation = CommandInvocation {
                input: trimmed,
                args,
            };
            (command.handler)(ctx, invocation)
        }
        None => CommandResult::SendMessage(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests;
