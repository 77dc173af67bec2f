//! `/stats` for the owner and sudo users.

use std::sync::Arc;

use warden_core::ParseMode;
use warden_framework::prelude::*;

use super::{CORE_GROUP, CoreSettings};

pub(super) fn register(table: &mut HandlerTable, core: &Arc<CoreSettings>) {
    let sudoers = core.bot.sudoers();
    table.add(
        CORE_GROUP,
        Handler::new(command(&["stats"]).and(from_users(sudoers)), stats).named("core.stats"),
    );
}

async fn stats(ctx: Arc<DispatchContext>) -> ActionResult {
    let lines = ctx.broadcast().stats().await;
    let text = if lines.is_empty() {
        "No module reports statistics.".to_string()
    } else {
        format!("Current stats:\n{}", lines.join("\n"))
    };
    ctx.reply(&text, ParseMode::Html, None).await?;
    Ok(Outcome::Continue)
}
