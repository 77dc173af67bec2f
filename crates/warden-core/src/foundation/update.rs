//! Inbound updates and the identities they carry.
//!
//! An [`Update`] is immutable once the transport has built it. The dispatch
//! loop owns it for one pass and shares it with matched actions behind an
//! `Arc`.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::foundation::error::ApiError;

// =============================================================================
// Identities
// =============================================================================

/// Opaque numeric chat identity.
///
/// Stable for the lifetime of a chat except across a migration, where the
/// old id is superseded by a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Opaque numeric user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Message identity, unique within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

// =============================================================================
// Chats and users
// =============================================================================

/// The kind of conversation an update originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// Originating chat of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    pub kind: ChatKind,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chat {
    /// A one-to-one chat with a user.
    pub fn private(id: i64) -> Self {
        Self {
            id: ChatId(id),
            kind: ChatKind::Private,
            title: None,
        }
    }

    /// A group chat with the given title.
    pub fn group(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: ChatId(id),
            kind: ChatKind::Group,
            title: Some(title.into()),
        }
    }

    pub fn is_private(&self) -> bool {
        self.kind == ChatKind::Private
    }

    /// Title for display, falling back to the numeric id.
    pub fn display_name(&self) -> String {
        self.title.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Originating user of an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl User {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            first_name: first_name.into(),
            username: None,
            is_bot: false,
        }
    }
}

// =============================================================================
// Payloads
// =============================================================================

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to: Option<Box<Message>>,
}

impl Message {
    /// A plain text message.
    pub fn text(message_id: i64, text: impl Into<String>) -> Self {
        Self {
            message_id: MessageId(message_id),
            from: None,
            text: Some(text.into()),
            reply_to: None,
        }
    }

    /// Sets the sender (builder pattern).
    pub fn from_user(mut self, user: User) -> Self {
        self.from = Some(user);
        self
    }

    /// Marks this message as a reply to `other` (builder pattern).
    pub fn replying_to(mut self, other: Message) -> Self {
        self.reply_to = Some(Box::new(other));
        self
    }
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Id used to answer (acknowledge) the query.
    pub id: String,
    /// Callback data carried by the pressed button.
    #[serde(default)]
    pub data: Option<String>,
    /// The message the keyboard was attached to.
    #[serde(default)]
    pub message: Option<Message>,
}

/// Service notice that a chat's identity changed.
///
/// The backend reports a migration twice: once in the old chat
/// (`migrate_to_chat_id` set) and once in the new chat
/// (`migrate_from_chat_id` set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationNotice {
    #[serde(default)]
    pub migrate_to_chat_id: Option<ChatId>,
    #[serde(default)]
    pub migrate_from_chat_id: Option<ChatId>,
}

impl MigrationNotice {
    /// Notice delivered in the old chat.
    pub fn to(new_chat: ChatId) -> Self {
        Self {
            migrate_to_chat_id: Some(new_chat),
            migrate_from_chat_id: None,
        }
    }

    /// Notice delivered in the new chat.
    pub fn from(old_chat: ChatId) -> Self {
        Self {
            migrate_to_chat_id: None,
            migrate_from_chat_id: Some(old_chat),
        }
    }

    /// Resolves `(old, new)` given the chat the notice arrived in.
    pub fn resolve(&self, current: ChatId) -> Option<(ChatId, ChatId)> {
        match (self.migrate_to_chat_id, self.migrate_from_chat_id) {
            (Some(new), _) => Some((current, new)),
            (None, Some(old)) => Some((old, current)),
            (None, None) => None,
        }
    }
}

// =============================================================================
// Update
// =============================================================================

/// Discriminated payload of an [`Update`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    CallbackQuery(CallbackQuery),
    Migration(MigrationNotice),
    /// A transport-level failure surfaced while polling, not a user update.
    #[serde(skip)]
    Error(ApiError),
}

/// One inbound event from the messaging transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: u64,
    #[serde(default)]
    pub chat: Option<Chat>,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(flatten)]
    pub kind: UpdateKind,
    /// Arrival time, stamped by the transport. Non-decreasing per chat.
    #[serde(skip, default = "Instant::now")]
    pub received_at: Instant,
}

impl Update {
    /// Creates an update received now.
    pub fn new(update_id: u64, kind: UpdateKind) -> Self {
        Self {
            update_id,
            chat: None,
            from: None,
            kind,
            received_at: Instant::now(),
        }
    }

    /// Wraps a transport error.
    pub fn error(err: ApiError) -> Self {
        Self::new(0, UpdateKind::Error(err))
    }

    /// Sets the originating chat (builder pattern).
    pub fn in_chat(mut self, chat: Chat) -> Self {
        self.chat = Some(chat);
        self
    }

    /// Sets the originating user (builder pattern).
    pub fn sent_by(mut self, user: User) -> Self {
        self.from = Some(user);
        self
    }

    /// Overrides the arrival timestamp (builder pattern).
    pub fn at(mut self, received_at: Instant) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.chat.as_ref().map(|c| c.id)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.from.as_ref().map(|u| u.id)
    }

    /// Returns `true` for transport-error updates.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, UpdateKind::Error(_))
    }

    /// The message this update carries, if any: a new or edited message, or
    /// the message a pressed keyboard was attached to.
    pub fn effective_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(m),
            UpdateKind::CallbackQuery(q) => q.message.as_ref(),
            UpdateKind::Migration(_) | UpdateKind::Error(_) => None,
        }
    }

    /// Text of a new or edited message.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => m.text.as_deref(),
            _ => None,
        }
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    pub fn migration(&self) -> Option<&MigrationNotice> {
        match &self.kind {
            UpdateKind::Migration(n) => Some(n),
            _ => None,
        }
    }

    /// Short kind name used as a span field.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::Migration(_) => "migration",
            UpdateKind::Error(_) => "error",
        }
    }
}
