//! `/help` and the help menu.

use std::sync::Arc;

use tracing::debug;

use warden_core::{InlineButton, InlineKeyboard, ParseMode};
use warden_framework::prelude::*;
use warden_framework::{HELP_PREFIX, registry_menu};

use super::{CORE_GROUP, CoreSettings, escape_html, module_help_page, present, start_link};

pub(super) fn register(table: &mut HandlerTable, core: &Arc<CoreSettings>) {
    let on_command = Arc::clone(core);
    table.add(
        CORE_GROUP,
        Handler::new(command(&["help"]), move |ctx| {
            help_command(ctx, Arc::clone(&on_command))
        })
        .named("core.help"),
    );

    let on_button = Arc::clone(core);
    table.add(
        CORE_GROUP,
        Handler::new(callback_prefix(HELP_PREFIX), move |ctx| {
            help_button(ctx, Arc::clone(&on_button))
        })
        .named("core.help_button"),
    );
}

/// The main help text for `bot_name`.
pub(super) fn help_text(bot_name: &str, core: &CoreSettings) -> String {
    let excl = if core.bot.allow_excl {
        " or <code>!</code>"
    } else {
        ""
    };
    let info = core.bot.info_help.as_deref().unwrap_or_default();
    format!(
        "<b>Help</b>\n\n\
         Hey there! My name is <b>{name}</b>.\n\
         I am <b>a group management bot</b>, having a lot of useful features \
         which may help you operate groups you are in!\n\n\
         <b>User commands:</b>\n \
         - /start: Start me. You've probably already used this.\n \
         - /help: Send this message.\n   \
         -> /help <code>&lt;module&gt;</code>: Send you info of the module.\n\
         {info}\n\
         All commands can be used with the following: <code>/</code>{excl}",
        name = escape_html(bot_name),
    )
}

/// Shows page `index` of the help menu.
///
/// Returns `false` when the page does not exist.
pub(super) async fn show_menu(
    ctx: &DispatchContext,
    core: &CoreSettings,
    index: usize,
) -> Result<bool, ActionError> {
    let text = help_text(ctx.bot().first_name(), core);
    let keyboard = registry_menu(MenuKind::Help, index, ctx.registry(), core.layout);
    if keyboard.is_none() && index > 0 {
        return Ok(false);
    }
    present(ctx, &text, keyboard.as_ref()).await?;
    Ok(true)
}

/// Shows one module's help page. Returns `false` for unknown modules.
pub(super) async fn show_module(ctx: &DispatchContext, name: &str) -> Result<bool, ActionError> {
    let Some(module) = ctx.registry().lookup(Capability::Help, name) else {
        return Ok(false);
    };
    let (text, keyboard) = module_help_page(module);
    present(ctx, &text, Some(&keyboard)).await?;
    Ok(true)
}

async fn help_command(ctx: Arc<DispatchContext>, core: Arc<CoreSettings>) -> ActionResult {
    let requested = ctx
        .args()
        .first()
        .map(|name| name.to_lowercase())
        .filter(|name| ctx.registry().lookup(Capability::Help, name).is_some());

    let is_private = ctx.chat().is_some_and(|c| c.is_private());
    if !is_private {
        let payload = format!("help_{}", requested.unwrap_or_default());
        let keyboard = InlineKeyboard::new().row(vec![InlineButton::url(
            "Help",
            start_link(ctx.bot().username(), &payload),
        )]);
        ctx.reply("Contact me in PM for help.", ParseMode::Plain, Some(&keyboard))
            .await?;
        return Ok(Outcome::Continue);
    }

    match requested {
        Some(name) => {
            show_module(&ctx, &name).await?;
        }
        None => {
            show_menu(&ctx, &core, 0).await?;
        }
    }
    Ok(Outcome::Continue)
}

async fn help_button(ctx: Arc<DispatchContext>, core: Arc<CoreSettings>) -> ActionResult {
    let Some(query) = ctx.callback_query() else {
        return Ok(Outcome::Continue);
    };

    let shown = match query.data.as_deref().map(str::parse::<CallbackData>) {
        Some(Ok(CallbackData::HelpModule(name))) => show_module(&ctx, &name).await,
        Some(Ok(CallbackData::HelpPrev(page))) => {
            show_menu(&ctx, &core, page.saturating_sub(1)).await
        }
        Some(Ok(CallbackData::HelpNext(page))) => match page.checked_add(1) {
            Some(next) => show_menu(&ctx, &core, next).await,
            None => Ok(false),
        },
        Some(Ok(CallbackData::HelpBack)) => show_menu(&ctx, &core, 0).await,
        Some(Ok(other)) => {
            debug!(data = %other, "Ignoring non-help payload");
            Ok(false)
        }
        Some(Err(e)) => {
            debug!(error = %e, "Ignoring undecodable help payload");
            Ok(false)
        }
        None => Ok(false),
    };

    // Answered even when the edit failed, so the client stops spinning.
    ctx.bot().answer_callback(&query.id).await?;
    shown?;
    Ok(Outcome::Continue)
}
