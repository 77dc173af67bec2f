//! `/settings` and the admin-gated chat settings menu.

use std::sync::Arc;

use tracing::debug;

use warden_core::{ChatId, InlineButton, InlineKeyboard, ParseMode, UserId};
use warden_framework::prelude::*;
use warden_framework::{SETTINGS_PREFIX, registry_menu};

use super::{CORE_GROUP, CoreSettings, escape_html, present, start_link};

const NO_USER_SETTINGS: &str = "Seems like there aren't any user specific settings available :'(";
const NO_CHAT_SETTINGS: &str = "Seems like there aren't any chat settings available :'(\n\
     Send this in a group chat you're admin in to find its current settings!";

pub(super) fn register(table: &mut HandlerTable, core: &Arc<CoreSettings>) {
    table.add(
        CORE_GROUP,
        Handler::new(command(&["settings"]), settings_command).named("core.settings"),
    );

    let core = Arc::clone(core);
    table.add(
        CORE_GROUP,
        Handler::new(callback_prefix(SETTINGS_PREFIX), move |ctx| {
            settings_button(ctx, Arc::clone(&core))
        })
        .named("core.settings_button"),
    );
}

async fn is_admin(ctx: &DispatchContext, chat: ChatId, user: UserId) -> Result<bool, ActionError> {
    Ok(ctx.bot().is_chat_admin(chat, user).await?)
}

/// Lists the sender's settings from every user-settings module.
async fn show_user_settings(ctx: &DispatchContext, user: UserId) -> Result<(), ActionError> {
    let sections = ctx.broadcast().user_settings(user).await;
    let text = if sections.is_empty() {
        NO_USER_SETTINGS.to_string()
    } else {
        let body: Vec<String> = sections
            .iter()
            .map(|(module, text)| format!("<b>{}</b>:\n{text}", escape_html(module)))
            .collect();
        format!("These are your current settings:\n\n{}", body.join("\n\n"))
    };
    present(ctx, &text, None).await?;
    Ok(())
}

/// Shows page `index` of `chat`'s settings menu. Returns `false` when the
/// page does not exist.
async fn show_chat_menu(
    ctx: &DispatchContext,
    core: &CoreSettings,
    chat: ChatId,
    index: usize,
) -> Result<bool, ActionError> {
    if ctx.registry().all_with(Capability::ChatSettings).is_empty() {
        present(ctx, NO_CHAT_SETTINGS, None).await?;
        return Ok(true);
    }
    let Some(keyboard) = registry_menu(MenuKind::Settings(chat), index, ctx.registry(), core.layout)
    else {
        return Ok(false);
    };
    let text = format!(
        "Hi there! There are quite a few settings for <code>{chat}</code> - \
         go ahead and pick what you're interested in."
    );
    present(ctx, &text, Some(&keyboard)).await?;
    Ok(true)
}

async fn show_chat_module(
    ctx: &DispatchContext,
    chat: ChatId,
    user: UserId,
    name: &str,
) -> Result<bool, ActionError> {
    let Some(module) = ctx.registry().lookup(Capability::ChatSettings, name) else {
        return Ok(false);
    };
    let Some(hook) = module.chat_settings_hook() else {
        return Ok(false);
    };
    let current = hook(chat, user).await.map_err(ActionError::Fault)?;
    let text = format!(
        "<code>{chat}</code> has the following settings for the <b>{}</b> module:\n\n{current}",
        escape_html(module.name())
    );
    present(ctx, &text, Some(&MenuKind::Settings(chat).back_keyboard())).await?;
    Ok(true)
}

/// Handles `/start stngs_<chat>`: chat settings for its admins, the
/// sender's own settings for everyone else.
pub(super) async fn open_from_link(
    ctx: &DispatchContext,
    core: &CoreSettings,
    chat: ChatId,
) -> Result<(), ActionError> {
    let Some(user) = ctx.user().map(|u| u.id) else {
        return Ok(());
    };
    if is_admin(ctx, chat, user).await? {
        show_chat_menu(ctx, core, chat, 0).await?;
    } else {
        show_user_settings(ctx, user).await?;
    }
    Ok(())
}

async fn settings_command(ctx: Arc<DispatchContext>) -> ActionResult {
    let (Some(chat), Some(user)) = (ctx.chat_id(), ctx.user().map(|u| u.id)) else {
        return Ok(Outcome::Continue);
    };

    if ctx.chat().is_some_and(|c| c.is_private()) {
        show_user_settings(&ctx, user).await?;
        return Ok(Outcome::Continue);
    }

    let text = if is_admin(&ctx, chat, user).await? {
        "Click here to get this chat's settings, as well as yours."
    } else {
        "Click here to check your settings."
    };
    let keyboard = InlineKeyboard::new().row(vec![InlineButton::url(
        "Settings",
        start_link(ctx.bot().username(), &format!("stngs_{chat}")),
    )]);
    ctx.reply(text, ParseMode::Plain, Some(&keyboard)).await?;
    Ok(Outcome::Continue)
}

async fn settings_button(ctx: Arc<DispatchContext>, core: Arc<CoreSettings>) -> ActionResult {
    let Some(query) = ctx.callback_query() else {
        return Ok(Outcome::Continue);
    };
    let Some(user) = ctx.user().map(|u| u.id) else {
        ctx.bot().answer_callback(&query.id).await?;
        return Ok(Outcome::Continue);
    };

    let payload = match query.data.as_deref().map(str::parse::<CallbackData>) {
        Some(Ok(payload)) => payload,
        Some(Err(e)) => {
            debug!(error = %e, "Ignoring undecodable settings payload");
            ctx.bot().answer_callback(&query.id).await?;
            return Ok(Outcome::Continue);
        }
        None => {
            ctx.bot().answer_callback(&query.id).await?;
            return Ok(Outcome::Continue);
        }
    };

    let chat = match &payload {
        CallbackData::SettingsModule { chat, .. }
        | CallbackData::SettingsPrev { chat, .. }
        | CallbackData::SettingsNext { chat, .. }
        | CallbackData::SettingsBack(chat) => *chat,
        other => {
            debug!(data = %other, "Ignoring non-settings payload");
            ctx.bot().answer_callback(&query.id).await?;
            return Ok(Outcome::Continue);
        }
    };

    if !is_admin(&ctx, chat, user).await? {
        debug!(chat_id = chat.0, user_id = user.0, "Settings button pressed by non-admin");
        ctx.bot().answer_callback(&query.id).await?;
        return Ok(Outcome::Continue);
    }

    let shown = match payload {
        CallbackData::SettingsModule { module, .. } => {
            show_chat_module(&ctx, chat, user, &module).await
        }
        CallbackData::SettingsPrev { page, .. } => {
            show_chat_menu(&ctx, &core, chat, page.saturating_sub(1)).await
        }
        CallbackData::SettingsNext { page, .. } => match page.checked_add(1) {
            Some(next) => show_chat_menu(&ctx, &core, chat, next).await,
            None => Ok(false),
        },
        _ => show_chat_menu(&ctx, &core, chat, 0).await,
    };

    ctx.bot().answer_callback(&query.id).await?;
    shown?;
    Ok(Outcome::Continue)
}
