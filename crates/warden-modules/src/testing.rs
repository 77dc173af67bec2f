//! Fixtures for the module tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_core::{
    ApiResult, Bot, BoxedBot, Chat, ChatId, InlineKeyboard, Message, MessageId, MessageRef,
    ParseMode, Update, UpdateKind, User, UserId,
};
use warden_framework::{Dispatcher, HandlerTable, Module, ModuleRegistry};

pub(crate) const BOT_ID: i64 = 4242;

static NEXT_UPDATE_ID: AtomicU64 = AtomicU64::new(1);

/// Bot that records sent texts.
#[derive(Default)]
pub(crate) struct MockBot {
    pub sent: Mutex<Vec<String>>,
}

impl MockBot {
    pub fn last(&self) -> Option<String> {
        self.sent.lock().last().cloned()
    }
}

#[async_trait]
impl Bot for MockBot {
    fn id(&self) -> UserId {
        UserId(BOT_ID)
    }

    fn username(&self) -> &str {
        "warden_bot"
    }

    fn first_name(&self) -> &str {
        "Warden"
    }

    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        _parse_mode: ParseMode,
        _keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<MessageRef> {
        let mut sent = self.sent.lock();
        sent.push(text.to_string());
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

/// A dispatcher serving only `module`.
pub(crate) fn dispatcher(module: &dyn Module, bot: &Arc<MockBot>) -> Dispatcher {
    let mut table = HandlerTable::new();
    module.register_handlers(&mut table);
    let registry = ModuleRegistry::from_descriptors([module.descriptor()]).unwrap();
    Dispatcher::builder(Arc::clone(bot) as BoxedBot)
        .registry(registry)
        .table(table)
        .build()
}

pub(crate) fn user(id: i64) -> User {
    User::new(id, format!("User{id}"))
}

fn next_id() -> u64 {
    NEXT_UPDATE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A group message from `from`.
pub(crate) fn text(from: i64, body: &str) -> Update {
    let id = next_id();
    let message = Message::text(id as i64, body).from_user(user(from));
    Update::new(id, UpdateKind::Message(message))
        .in_chat(Chat::group(-100, "Test Group"))
        .sent_by(user(from))
}

/// A private message from `from`.
pub(crate) fn private(from: i64, body: &str) -> Update {
    let id = next_id();
    let message = Message::text(id as i64, body).from_user(user(from));
    Update::new(id, UpdateKind::Message(message))
        .in_chat(Chat::private(from))
        .sent_by(user(from))
}

/// A group message from `from` replying to a message sent by `to`.
pub(crate) fn reply(from: i64, to: User, body: &str) -> Update {
    let id = next_id();
    let message = Message::text(id as i64, body)
        .from_user(user(from))
        .replying_to(Message::text(1, "earlier").from_user(to));
    Update::new(id, UpdateKind::Message(message))
        .in_chat(Chat::group(-100, "Test Group"))
        .sent_by(user(from))
}
