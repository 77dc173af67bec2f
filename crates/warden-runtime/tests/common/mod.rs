#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use warden_core::{
    ApiResult, Bot, BoxedBot, CallbackQuery, Chat, ChatId, InlineKeyboard, Message, MessageId,
    MessageRef, MigrationNotice, ParseMode, Update, UpdateKind, User, UserId,
};
use warden_framework::{Handler, HandlerTable, Module, ModuleDescriptor};
use warden_runtime::{WardenConfig, WardenRuntime};

// ============================================================================
// Recording bot
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Send {
        chat: ChatId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Edit {
        message: MessageRef,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    Answer(String),
}

/// Bot that records every outbound call. Admin checks consult a fixed set.
#[derive(Default)]
pub struct RecordingBot {
    calls: Mutex<Vec<Call>>,
    admins: Mutex<HashSet<(ChatId, UserId)>>,
    next_message: AtomicI64,
}

impl RecordingBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn make_admin(&self, chat: i64, user: i64) {
        self.admins.lock().insert((ChatId(chat), UserId(user)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Texts of sent (not edited) messages, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Send { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_sent(&self) -> Option<(String, Option<InlineKeyboard>)> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            Call::Send { text, keyboard, .. } => Some((text.clone(), keyboard.clone())),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Bot for RecordingBot {
    fn id(&self) -> UserId {
        UserId(4242)
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
        keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<MessageRef> {
        self.calls.lock().push(Call::Send {
            chat: chat_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        let id = self.next_message.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(id),
        })
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        _parse_mode: ParseMode,
        keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<()> {
        self.calls.lock().push(Call::Edit {
            message,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> ApiResult<()> {
        self.calls.lock().push(Call::Answer(callback_id.to_string()));
        Ok(())
    }

    async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<bool> {
        Ok(self.admins.lock().contains(&(chat_id, user_id)))
    }
}

pub fn boxed(bot: &Arc<RecordingBot>) -> BoxedBot {
    Arc::clone(bot) as BoxedBot
}

// ============================================================================
// Static module
// ============================================================================

/// A module assembled from a descriptor and a list of grouped handlers.
pub struct StaticModule {
    pub descriptor: ModuleDescriptor,
    pub handlers: Vec<(i32, Handler)>,
}

impl StaticModule {
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor,
            handlers: Vec::new(),
        }
    }

    pub fn handler(mut self, group: i32, handler: Handler) -> Self {
        self.handlers.push((group, handler));
        self
    }
}

impl Module for StaticModule {
    fn descriptor(&self) -> ModuleDescriptor {
        self.descriptor.clone()
    }

    fn register_handlers(&self, table: &mut HandlerTable) {
        for (group, handler) in &self.handlers {
            table.add(*group, handler.clone());
        }
    }
}

/// A runtime over the default configuration with `owner` as bot owner.
pub fn runtime(owner: i64, sudo: &[i64]) -> WardenRuntime {
    let mut config = WardenConfig::default();
    config.bot.owner_id = Some(UserId(owner));
    config.bot.sudo_users = sudo.iter().copied().map(UserId).collect();
    WardenRuntime::from_config(config)
}

// ============================================================================
// Update builders
// ============================================================================

pub const GROUP: i64 = -100;

static NEXT_UPDATE_ID: AtomicU64 = AtomicU64::new(1);

fn next_id() -> u64 {
    NEXT_UPDATE_ID.fetch_add(1, Ordering::Relaxed)
}

fn chat(id: i64) -> Chat {
    if id > 0 {
        Chat::private(id)
    } else {
        Chat::group(id, "Test Group")
    }
}

pub fn user(id: i64) -> User {
    User::new(id, format!("User{id}"))
}

/// A text message from `from` in chat `chat_id`; positive ids are private chats.
pub fn text(chat_id: i64, from: i64, text: &str) -> Update {
    let id = next_id();
    let message = Message::text(id as i64, text).from_user(user(from));
    Update::new(id, UpdateKind::Message(message))
        .in_chat(chat(chat_id))
        .sent_by(user(from))
}

/// A private message: the chat id equals the sender id.
pub fn private(from: i64, body: &str) -> Update {
    text(from, from, body)
}

/// A group message from `from` replying to a message sent by `to`.
pub fn reply(chat_id: i64, from: i64, to: User, body: &str) -> Update {
    let id = next_id();
    let replied = Message::text(1, "earlier").from_user(to);
    let message = Message::text(id as i64, body)
        .from_user(user(from))
        .replying_to(replied);
    Update::new(id, UpdateKind::Message(message))
        .in_chat(chat(chat_id))
        .sent_by(user(from))
}

/// A button press by `from` on message 77 of chat `chat_id`.
pub fn callback(chat_id: i64, from: i64, data: &str) -> Update {
    let id = next_id();
    Update::new(
        id,
        UpdateKind::CallbackQuery(CallbackQuery {
            id: format!("cb{id}"),
            data: Some(data.to_string()),
            message: Some(Message::text(77, "menu")),
        }),
    )
    .in_chat(chat(chat_id))
    .sent_by(user(from))
}

/// Notice delivered in `old` announcing the move to `new`.
pub fn migration(old: i64, new: i64) -> Update {
    Update::new(
        next_id(),
        UpdateKind::Migration(MigrationNotice::to(ChatId(new))),
    )
    .in_chat(chat(old))
}
