//! `/start` and its deep links.

use std::sync::Arc;

use warden_core::{ChatId, InlineButton, InlineKeyboard, ParseMode};
use warden_framework::prelude::*;

use super::{CORE_GROUP, CoreSettings, escape_html, help, settings};

pub(super) fn register(table: &mut HandlerTable, core: &Arc<CoreSettings>) {
    let core = Arc::clone(core);
    table.add(
        CORE_GROUP,
        Handler::new(command(&["start"]), move |ctx| start(ctx, Arc::clone(&core)))
            .named("core.start"),
    );
}

/// Payload of `/start <payload>`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeepLink {
    /// `help` or `help_` (the main menu).
    HelpMenu,
    /// `help_<module>`.
    HelpModule(String),
    /// `stngs_<chat_id>`.
    Settings(ChatId),
}

impl DeepLink {
    fn parse(arg: &str) -> Option<Self> {
        let arg = arg.to_lowercase();
        if let Some(rest) = arg.strip_prefix("help") {
            let module = rest.strip_prefix('_').unwrap_or(rest);
            return Some(if module.is_empty() {
                Self::HelpMenu
            } else {
                Self::HelpModule(module.to_string())
            });
        }
        arg.strip_prefix("stngs_")
            .and_then(|id| id.parse().ok())
            .map(|id| Self::Settings(ChatId(id)))
    }
}

fn start_text(user_name: &str, bot_name: &str, core: &CoreSettings) -> String {
    format!(
        "Hello {user}! My name is <b>{bot}</b>, a group management bot to help you manage groups!\n\
         {info}\n\
         Hit /help if you want to know more about me!",
        user = escape_html(user_name),
        bot = escape_html(bot_name),
        info = core.bot.info_start.as_deref().unwrap_or_default(),
    )
}

async fn start(ctx: Arc<DispatchContext>, core: Arc<CoreSettings>) -> ActionResult {
    if !ctx.chat().is_some_and(|c| c.is_private()) {
        ctx.reply_text("Hey there, I'm alive!").await?;
        return Ok(Outcome::Continue);
    }

    match ctx.args().first().and_then(|arg| DeepLink::parse(arg)) {
        Some(DeepLink::HelpModule(name)) => {
            if !help::show_module(&ctx, &name).await? {
                help::show_menu(&ctx, &core, 0).await?;
            }
        }
        Some(DeepLink::HelpMenu) => {
            help::show_menu(&ctx, &core, 0).await?;
        }
        Some(DeepLink::Settings(chat)) => {
            settings::open_from_link(&ctx, &core, chat).await?;
        }
        None => {
            let user_name = ctx.user().map(|u| u.first_name.as_str()).unwrap_or("there");
            let text = start_text(user_name, ctx.bot().first_name(), &core);
            let keyboard = InlineKeyboard::new().row(vec![InlineButton::url(
                "Add me to your group!",
                format!("t.me/{}?startgroup=true", ctx.bot().username()),
            )]);
            ctx.reply(&text, ParseMode::Html, Some(&keyboard)).await?;
        }
    }
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_links() {
        assert_eq!(DeepLink::parse("help"), Some(DeepLink::HelpMenu));
        assert_eq!(DeepLink::parse("help_"), Some(DeepLink::HelpMenu));
        assert_eq!(
            DeepLink::parse("help_Bios"),
            Some(DeepLink::HelpModule("bios".to_string()))
        );
        assert_eq!(
            DeepLink::parse("stngs_-100123"),
            Some(DeepLink::Settings(ChatId(-100123)))
        );
        assert_eq!(DeepLink::parse("stngs_x"), None);
        assert_eq!(DeepLink::parse("rules"), None);
    }

    #[test]
    fn test_start_text_escapes_names() {
        let core = CoreSettings::default();
        let text = start_text("<Ann>", "Warden", &core);
        assert!(text.starts_with("Hello &lt;Ann&gt;! My name is <b>Warden</b>"));
    }
}
