//! Core handlers every Warden bot carries.
//!
//! They are registered into the handler table before any feature module and
//! talk to modules only through the [`ModuleRegistry`](warden_framework::ModuleRegistry)
//! and [`CapabilityBroadcast`](warden_framework::CapabilityBroadcast).
//!
//! | Group | Handler |
//! |-------|---------|
//! | `-1`  | chat migration (always stops the walk) |
//! | `0`   | `/start`, `/help`, help menu, `/settings`, settings menu, `/gdpr`, `/info`, `/stats`, `/export`, `/import` |

mod backup;
mod gdpr;
mod help;
mod info;
mod migrate;
mod settings;
mod start;
mod stats;

use std::sync::Arc;

pub use warden_core::escape_html;
use warden_core::{ApiResult, InlineButton, InlineKeyboard, MessageRef, ParseMode};
use warden_framework::{DispatchContext, HandlerTable, MenuKind, MenuLayout, ModuleDescriptor};

use crate::config::BotSettings;

/// Group of the migration handler; runs before every module group.
pub const MIGRATION_GROUP: i32 = -1;

/// Group of the remaining core handlers.
pub const CORE_GROUP: i32 = 0;

/// Settings the core handlers read.
#[derive(Debug, Clone, Default)]
pub struct CoreSettings {
    pub bot: BotSettings,
    pub layout: MenuLayout,
}

/// Adds every core handler to `table`.
pub fn register_builtins(table: &mut HandlerTable, core: Arc<CoreSettings>) {
    migrate::register(table);
    start::register(table, &core);
    help::register(table, &core);
    settings::register(table, &core);
    gdpr::register(table);
    info::register(table, &core);
    stats::register(table, &core);
    backup::register(table);
}

/// Deep link that opens a private chat with the bot and sends `/start payload`.
pub(crate) fn start_link(bot_username: &str, payload: &str) -> String {
    format!("t.me/{bot_username}?start={payload}")
}

/// Shows a menu screen.
///
/// Edits the message the pressed button sits on, or sends a new message
/// when the update is not a button press.
pub(crate) async fn present(
    ctx: &DispatchContext,
    text: &str,
    keyboard: Option<&InlineKeyboard>,
) -> ApiResult<()> {
    let target = ctx
        .callback_query()
        .and_then(|q| q.message.as_ref())
        .zip(ctx.chat_id())
        .map(|(message, chat_id)| MessageRef {
            chat_id,
            message_id: message.message_id,
        });

    match target {
        Some(message) => {
            ctx.bot()
                .edit_message(message, text, ParseMode::Html, keyboard)
                .await
        }
        None => ctx.reply(text, ParseMode::Html, keyboard).await.map(|_| ()),
    }
}

/// Help page of one module: its extra rows followed by a "Back" row.
pub(crate) fn module_help_page(module: &ModuleDescriptor) -> (String, InlineKeyboard) {
    let text = format!(
        "<b>{}</b>\n{}",
        escape_html(module.name()),
        module.help_text().unwrap_or_default()
    );
    let mut keyboard = InlineKeyboard::from_rows(module.help_keyboard().to_vec());
    keyboard.push_row(vec![InlineButton::callback(
        "Back",
        MenuKind::Help.back().to_string(),
    )]);
    (text, keyboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::ButtonAction;

    #[test]
    fn test_module_help_page_appends_back() {
        let module = ModuleDescriptor::new("Notes")
            .help(" - /get: fetch a note")
            .help_keyboard_row(vec![InlineButton::url("Docs", "https://example.org")]);
        let (text, keyboard) = module_help_page(&module);

        assert_eq!(text, "<b>Notes</b>\n - /get: fetch a note");
        assert_eq!(keyboard.rows.len(), 2);
        assert_eq!(
            keyboard.rows[1][0].action,
            ButtonAction::CallbackData("help_back".to_string())
        );
    }

    #[test]
    fn test_start_link() {
        assert_eq!(start_link("warden_bot", "help_notes"), "t.me/warden_bot?start=help_notes");
    }
}
