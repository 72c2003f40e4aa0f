use std::fs;
use std::path::Path;

use crate::commands::registry::CommandInvocation;
use crate::commands::{CommandContext, CommandResult};

use super::usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    Normal,
    Summary,
    Explain,
    Refactor,
}

impl FileMode {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag.to_ascii_lowercase().as_str() {
            "summary" => Some(FileMode::Summary),
            "explain" => Some(FileMode::Explain),
            "refactor" => Some(FileMode::Refactor),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileMode::Normal => "normal",
            FileMode::Summary => "summary",
            FileMode::Explain => "explain",
            FileMode::Refactor => "refactor",
        }
    }

    fn instruction(self, filename: &str) -> String {
        match self {
            FileMode::Normal => format!("Here is the content of file `{filename}`:"),
            FileMode::Summary => "Provide a concise summary of this file.".to_string(),
            FileMode::Explain => {
                "Explain in detail what this file does, including architecture and logic."
                    .to_string()
            }
            FileMode::Refactor => "Refactor and improve this file. \
                 Improve readability, structure, and performance. \
                 Return the improved full code."
                .to_string(),
        }
    }
}

pub fn compose_file_message(mode: FileMode, filename: &str, content: &str) -> String {
    format!(
        "{}\n\nFile name: `{filename}`\n\n```\n{content}\n```",
        mode.instruction(filename)
    )
}

pub(crate) fn handle_file(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let (first, rest) = invocation.split_first();
    let Some(first) = first else {
        return usage(ctx, "Usage: /file [--summary|--explain|--refactor] <path>");
    };

    let (mode, raw_path) = match first.strip_prefix("--") {
        Some(flag) => {
            let Some(mode) = FileMode::from_flag(flag) else {
                ctx.warn(format!(
                    "Unknown file mode --{flag} (use --summary, --explain or --refactor)"
                ));
                return CommandResult::Continue;
            };
            if rest.is_empty() {
                return usage(ctx, "Missing file path.");
            }
            (mode, rest)
        }
        None => (FileMode::Normal, invocation.args),
    };

    let path = Path::new(raw_path.trim_matches('"'));
    if !path.exists() {
        ctx.error(format!("File not found: {}", path.display()));
        return CommandResult::Continue;
    }
    let mut content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            ctx.error(format!("Could not read file: {err}"));
            return CommandResult::Continue;
        }
    };

    let limit = ctx.config.file_char_limit;
    if content.chars().count() > limit {
        ctx.warn(format!("File too large. Truncating to {limit} characters."));
        content = content.chars().take(limit).collect();
    }

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ctx.success(format!(
        "Loaded file: {filename} ({} chars) | Mode: {}",
        content.chars().count(),
        mode.label()
    ));
    CommandResult::SendMessage(compose_file_message(mode, &filename, &content))
}
