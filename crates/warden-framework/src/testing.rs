//! Test fixtures shared by the unit tests of this crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_core::{
    ApiResult, Bot, BoxedBot, CallbackQuery, Chat, ChatId, InlineKeyboard, Message, MessageId,
    MessageRef, ParseMode, Update, UpdateKind, User, UserId,
};

use crate::context::DispatchContext;
use crate::module::ModuleRegistry;

static NEXT_UPDATE_ID: AtomicU64 = AtomicU64::new(1);

/// Bot that records sent texts and succeeds on every call.
#[derive(Default)]
pub(crate) struct MockBot {
    pub sent: Mutex<Vec<(ChatId, String)>>,
}

#[async_trait]
impl Bot for MockBot {
    fn id(&self) -> UserId {
        UserId(1000)
    }

    fn username(&self) -> &str {
        "test_bot"
    }

    fn first_name(&self) -> &str {
        "Test"
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        _parse_mode: ParseMode,
        _keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<MessageRef> {
        let mut sent = self.sent.lock();
        sent.push((chat_id, text.to_string()));
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(sent.len() as i64),
        })
    }

    async fn edit_message(
        &self,
        _message: MessageRef,
        _text: &str,
        _parse_mode: ParseMode,
        _keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn answer_callback(&self, _callback_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn is_chat_admin(&self, _chat_id: ChatId, _user_id: UserId) -> ApiResult<bool> {
        Ok(false)
    }
}

pub(crate) fn mock_bot() -> BoxedBot {
    Arc::new(MockBot::default())
}

fn chat(id: i64) -> Chat {
    if id > 0 {
        Chat::private(id)
    } else {
        Chat::group(id, "test group")
    }
}

/// A text message in chat `chat_id`; positive ids are private chats.
pub(crate) fn message_update(chat_id: i64, text: &str) -> Update {
    let id = NEXT_UPDATE_ID.fetch_add(1, Ordering::Relaxed);
    Update::new(id, UpdateKind::Message(Message::text(id as i64, text)))
        .in_chat(chat(chat_id))
        .sent_by(User::new(7, "Tester"))
}

/// A button press carrying `data` in chat `chat_id`.
pub(crate) fn callback_update(chat_id: i64, data: &str) -> Update {
    let id = NEXT_UPDATE_ID.fetch_add(1, Ordering::Relaxed);
    Update::new(
        id,
        UpdateKind::CallbackQuery(CallbackQuery {
            id: format!("cb{id}"),
            data: Some(data.to_string()),
            message: Some(Message::text(1, "menu")),
        }),
    )
    .in_chat(chat(chat_id))
    .sent_by(User::new(7, "Tester"))
}

/// A context over an empty registry accepting `/` and `!` commands.
pub(crate) fn context(update: Update) -> DispatchContext {
    DispatchContext::new(
        Arc::new(update),
        mock_bot(),
        Arc::new(ModuleRegistry::new()),
        Arc::from(['/', '!'].as_slice()),
    )
}
