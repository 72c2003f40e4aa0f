use crate::commands::registry::CommandInvocation;
use crate::commands::{CommandContext, CommandResult};
use crate::project::{ProjectError, ProjectIndex};

use super::usage;

const PROJECT_USAGE: &str = "Usage: /project add|remove|list|ask";

pub(crate) fn handle_project(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let (sub, rest) = invocation.split_first();
    match sub.map(str::to_ascii_lowercase).as_deref() {
        Some("add") => add(ctx, rest),
        Some("list") => list(ctx),
        Some("remove") => remove(ctx),
        Some("ask") => ask(ctx, rest),
        _ => usage(ctx, PROJECT_USAGE),
    }
}

fn add(ctx: &mut CommandContext<'_>, folder: &str) -> CommandResult {
    if folder.is_empty() {
        return usage(ctx, "Usage: /project add <folder>");
    }
    let folder = folder.trim_matches('"');

    ctx.info("Indexing project with symbol extraction...");
    match ProjectIndex::build(folder, &ctx.config.project.index_options()) {
        Ok(index) => {
            ctx.success(format!(
                "Indexed {} files, {} code blocks.",
                index.file_count(),
                index.block_count()
            ));
            ctx.session.project = index;
        }
        Err(err) => ctx.error(err.to_string()),
    }
    CommandResult::Continue
}

fn list(ctx: &mut CommandContext<'_>) -> CommandResult {
    if !ctx.session.project.is_loaded() {
        ctx.warn(ProjectError::EmptyIndex.to_string());
        return CommandResult::Continue;
    }

    let summaries = ctx.session.project.list();
    if summaries.is_empty() {
        ctx.warn("No indexed files.");
        return CommandResult::Continue;
    }

    let mut text = String::from("Indexed Files:");
    for summary in summaries {
        text.push_str(&format!(
            "\n  - {} (blocks: {}, chunks: {}, imports: {})",
            summary.path, summary.blocks, summary.chunks, summary.imports
        ));
    }
    ctx.info(text);
    CommandResult::Continue
}

fn remove(ctx: &mut CommandContext<'_>) -> CommandResult {
    ctx.session.project.remove();
    ctx.success("Project removed.");
    CommandResult::Continue
}

fn ask(ctx: &mut CommandContext<'_>, question: &str) -> CommandResult {
    if ctx.session.project.is_empty() {
        ctx.warn(ProjectError::EmptyIndex.to_string());
        return CommandResult::Continue;
    }
    if question.is_empty() {
        return usage(ctx, "Usage: /project ask <question>");
    }

    let retriever = ctx.config.project.retriever();
    let retrieval = match retriever.query(question, &ctx.session.project) {
        Ok(retrieval) => retrieval,
        Err(err) => {
            ctx.error(err.to_string());
            return CommandResult::Continue;
        }
    };

    if retrieval.fell_back {
        ctx.warn("No strong matches found. Using top blocks.");
    }
    if let Some(target) = &retrieval.traceback_target {
        ctx.info(format!("Traceback points at {target}"));
    }
    ctx.info(format!(
        "Using {} files ({} chars).",
        retrieval.used_files.len(),
        retrieval.used_chars
    ));
    CommandResult::SendMessage(retrieval.prompt(question))
}
