//! `/export` and `/import`: per-chat backups assembled from module sections.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use warden_core::{ChatId, ParseMode};
use warden_framework::prelude::*;

use super::{CORE_GROUP, escape_html};

const BACKUP_VERSION: u32 = 1;

/// The document `/export` sends and `/import` reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBackup {
    pub version: u32,
    pub chat_id: ChatId,
    /// One section per exporting module, keyed by lowercase module name.
    pub data: Map<String, Value>,
}

pub(super) fn register(table: &mut HandlerTable) {
    table.add(
        CORE_GROUP,
        Handler::new(command(&["export"]).and(group_chat()), export).named("core.export"),
    );
    table.add(
        CORE_GROUP,
        Handler::new(command(&["import"]).and(group_chat()), import).named("core.import"),
    );
}

/// Returns the chat when the sender administers it, replying otherwise.
async fn admin_chat(ctx: &DispatchContext) -> Result<Option<ChatId>, ActionError> {
    let (Some(chat), Some(user)) = (ctx.chat_id(), ctx.user().map(|u| u.id)) else {
        return Ok(None);
    };
    if ctx.bot().is_chat_admin(chat, user).await? {
        Ok(Some(chat))
    } else {
        ctx.reply_text("You need to be a chat admin to do that.").await?;
        Ok(None)
    }
}

async fn export(ctx: Arc<DispatchContext>) -> ActionResult {
    let Some(chat) = admin_chat(&ctx).await? else {
        return Ok(Outcome::Continue);
    };

    let backup = ChatBackup {
        version: BACKUP_VERSION,
        chat_id: chat,
        data: ctx.broadcast().export_chat(chat).await,
    };
    let json = serde_json::to_string_pretty(&backup)?;
    info!(chat_id = chat.0, sections = backup.data.len(), "Exported chat backup");

    ctx.reply(
        &format!("<code>{}</code>", escape_html(&json)),
        ParseMode::Html,
        None,
    )
    .await?;
    Ok(Outcome::Continue)
}

async fn import(ctx: Arc<DispatchContext>) -> ActionResult {
    let Some(chat) = admin_chat(&ctx).await? else {
        return Ok(Outcome::Continue);
    };

    let raw = ctx.command().map(|c| c.raw_args.trim()).unwrap_or_default();
    if raw.is_empty() {
        ctx.reply_text("Send the backup from /export after the command to import it.")
            .await?;
        return Ok(Outcome::Continue);
    }

    let backup: ChatBackup = match serde_json::from_str(raw) {
        Ok(backup) => backup,
        Err(e) => {
            ctx.reply_text(&format!("I can't read that backup: {e}")).await?;
            return Ok(Outcome::Continue);
        }
    };
    if backup.chat_id != chat {
        ctx.reply_text("This backup comes from another chat, I can't restore it here.")
            .await?;
        return Ok(Outcome::Continue);
    }

    let report = ctx.broadcast().import_chat(chat, &backup.data).await;
    info!(
        chat_id = chat.0,
        imported = report.succeeded.len(),
        failed = report.failed.len(),
        "Imported chat backup"
    );

    if report.is_clean() {
        ctx.reply_text("Backup fully imported. Welcome back! :D").await?;
    } else {
        let failed: Vec<&str> = report.failed.iter().map(|(m, _)| m.as_str()).collect();
        ctx.reply_text(&format!(
            "Backup imported, except for these modules: {}",
            failed.join(", ")
        ))
        .await?;
    }
    Ok(Outcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backup_document_shape() {
        let mut data = Map::new();
        data.insert("notes".to_string(), json!({"count": 2}));
        let backup = ChatBackup {
            version: BACKUP_VERSION,
            chat_id: ChatId(-100),
            data,
        };

        let value = serde_json::to_value(&backup).unwrap();
        assert_eq!(
            value,
            json!({"version": 1, "chat_id": -100, "data": {"notes": {"count": 2}}})
        );
        let back: ChatBackup = serde_json::from_value(value).unwrap();
        assert_eq!(back, backup);
    }
}
