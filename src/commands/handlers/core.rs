use crate::commands::registry::CommandInvocation;
use crate::commands::{all_commands, CommandContext, CommandResult};
use crate::utils::clipboard::copy_to_clipboard;

use super::usage;

pub(crate) fn handle_help(
    ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Ferret Help Menu\n");
    for command in all_commands() {
        for usage in command.usages {
            help.push_str(&format!("\n  {:<26} {}", usage.syntax, usage.description));
        }
    }

    let aliases: Vec<String> = all_commands()
        .iter()
        .flat_map(|command| {
            command
                .aliases
                .iter()
                .map(move |alias| format!("/{alias} = /{}", command.name))
        })
        .collect();
    if !aliases.is_empty() {
        help.push_str(&format!("\n\nShortcuts: {}", aliases.join(", ")));
    }

    ctx.info(help);
    CommandResult::Continue
}

pub(crate) fn handle_clear(
    ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    ctx.session.reset();
    ctx.success("Context purged. Memory fresh.");
    CommandResult::Continue
}

pub(crate) fn handle_exit(
    ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    ctx.info("Signing off.");
    CommandResult::Exit
}

pub(crate) fn handle_code(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let language = invocation.arg(0).unwrap_or_default().to_string();
    ctx.info("Entering code mode. Type '/end' to send.");
    CommandResult::StartCodeMode { language }
}

/// Wrap lines entered in code mode as a fenced block. `None` when nothing
/// was entered.
pub fn compose_code_message(language: &str, lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    Some(format!("```{language}\n{}\n```", lines.join("\n")))
}

pub(crate) fn handle_copy(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let number = match (invocation.arg(0), invocation.arg(1)) {
        (Some(value), None) => value.parse::<usize>().ok(),
        _ => None,
    };
    let Some(number) = number else {
        return usage(ctx, "Usage: /copy <number>");
    };

    let body = match ctx.session.code_blocks.get(number) {
        Ok(body) => body.to_string(),
        Err(err) => {
            ctx.warn(err.to_string());
            return CommandResult::Continue;
        }
    };

    match copy_to_clipboard(&body) {
        Ok(tool) => {
            tracing::debug!(tool, "Copied code block {number}");
            ctx.success(format!("Copied code block {number}"));
        }
        Err(err) => ctx.error(err),
    }
    CommandResult::Continue
}
