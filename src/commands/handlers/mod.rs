pub(super) mod core;
pub(super) mod io;
pub(super) mod project;

use crate::commands::{CommandContext, CommandResult};

pub(super) fn usage(ctx: &mut CommandContext<'_>, usage: &'static str) -> CommandResult {
    ctx.warn(usage);
    CommandResult::Continue
}
