//! `/gdpr`: erase the sender's data from every module.

use std::sync::Arc;

use tracing::info;

use warden_framework::prelude::*;

use super::CORE_GROUP;

const ERASED: &str = "Your personal data has been deleted.\n\n\
    Note that this will not unban you from any chats, as that is chat data, not bot data. \
    Flood records, warnings and bans are also preserved.";

pub(super) fn register(table: &mut HandlerTable) {
    table.add(
        CORE_GROUP,
        Handler::new(command(&["gdpr"]).and(private_chat()), gdpr).named("core.gdpr"),
    );
}

async fn gdpr(ctx: Arc<DispatchContext>) -> ActionResult {
    let Some(user) = ctx.user().map(|u| u.id) else {
        return Ok(Outcome::Continue);
    };

    let report = ctx.broadcast().erase_user(user).await;
    info!(
        user_id = user.0,
        erased = report.succeeded.len(),
        failed = report.failed.len(),
        "Erased user data"
    );

    if report.is_clean() {
        ctx.reply_text(ERASED).await?;
    } else {
        let failed: Vec<&str> = report.failed.iter().map(|(m, _)| m.as_str()).collect();
        ctx.reply_text(&format!(
            "{ERASED}\n\nThese modules could not erase your data yet, please try again later: {}",
            failed.join(", ")
        ))
        .await?;
    }
    Ok(Outcome::Continue)
}
