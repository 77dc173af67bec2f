//! `/info`: who a user is, plus what modules know about them.

use std::sync::Arc;

use warden_core::{ParseMode, User, UserId};
use warden_framework::prelude::*;

use super::{CORE_GROUP, CoreSettings, escape_html};

pub(super) fn register(table: &mut HandlerTable, core: &Arc<CoreSettings>) {
    let core = Arc::clone(core);
    table.add(
        CORE_GROUP,
        Handler::new(command(&["info"]), move |ctx| info(ctx, Arc::clone(&core)))
            .named("core.info"),
    );
}

/// The user `/info` is about: the replied-to sender, a numeric id
/// argument, or the sender.
fn target(ctx: &DispatchContext) -> Option<User> {
    let replied = ctx
        .update()
        .effective_message()
        .and_then(|m| m.reply_to.as_deref())
        .and_then(|m| m.from.clone());
    if replied.is_some() {
        return replied;
    }

    if let Some(id) = ctx.args().first().and_then(|arg| arg.parse::<i64>().ok()) {
        return Some(User::new(id, ""));
    }

    ctx.user().cloned()
}

fn role_line(core: &CoreSettings, user: UserId) -> Option<&'static str> {
    if core.bot.is_owner(user) {
        Some("This person is my owner - I would never do anything against them!")
    } else if core.bot.sudo_users.contains(&user) {
        Some("This person is one of my sudo users! Nearly as powerful as my owner - so watch it.")
    } else if core.bot.support_users.contains(&user) {
        Some("This person is one of my support users! Not quite a sudo user, but close.")
    } else {
        None
    }
}

fn identity_text(user: &User, core: &CoreSettings) -> String {
    let mut text = format!("<b>User info</b>:\nID: <code>{}</code>", user.id);
    if !user.first_name.is_empty() {
        text.push_str(&format!("\nFirst Name: {}", escape_html(&user.first_name)));
    }
    if let Some(username) = &user.username {
        text.push_str(&format!("\nUsername: @{}", escape_html(username)));
    }
    if let Some(role) = role_line(core, user.id) {
        text.push_str("\n\n");
        text.push_str(role);
    }
    text
}

async fn info(ctx: Arc<DispatchContext>, core: Arc<CoreSettings>) -> ActionResult {
    let Some(user) = target(&ctx) else {
        return Ok(Outcome::Continue);
    };

    let mut text = identity_text(&user, &core);
    for section in ctx.broadcast().user_info(user.id).await {
        text.push_str("\n\n");
        text.push_str(section.trim());
    }

    ctx.reply(&text, ParseMode::Html, None).await?;
    Ok(Outcome::Continue)
}
