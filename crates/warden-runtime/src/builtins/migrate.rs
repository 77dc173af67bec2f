//! Chat migration.

use std::sync::Arc;

use tracing::debug;

use warden_framework::prelude::*;

use super::MIGRATION_GROUP;

pub(super) fn register(table: &mut HandlerTable) {
    table.add(
        MIGRATION_GROUP,
        Handler::new(migration(), migrate_chat).named("core.migrate"),
    );
}

/// Resolves the notice against the chat it arrived in and moves every
/// module's state. Notices are terminal even when they cannot be resolved.
async fn migrate_chat(ctx: Arc<DispatchContext>) -> ActionResult {
    let resolved = ctx
        .update()
        .migration()
        .zip(ctx.chat_id())
        .and_then(|(notice, current)| notice.resolve(current));

    match resolved {
        Some((old, new)) => Ok(ctx.broadcast().on_migration(old, new).await),
        None => {
            debug!("Migration notice without a source or target chat");
            Ok(Outcome::StopGroupWalk)
        }
    }
}
