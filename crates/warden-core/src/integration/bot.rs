//! Bot trait.
//!
//! A [`Bot`] is the handle feature actions use to talk back to the messaging
//! backend. The transport collaborator implements it; the dispatch core only
//! passes it around inside the per-dispatch context and never calls it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::foundation::error::ApiResult;
use crate::foundation::keyboard::{InlineKeyboard, ParseMode};
use crate::foundation::update::{ChatId, MessageId, UserId};

/// Location of a sent message, needed to edit it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The outbound backend API.
#[async_trait]
pub trait Bot: Send + Sync {
    /// The bot account's own user id.
    fn id(&self) -> UserId;

    /// The bot account's username, without the leading `@`.
    fn username(&self) -> &str;

    /// The bot account's display name.
    fn first_name(&self) -> &str;

    /// Sends a new message.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        parse_mode: ParseMode,
        keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<MessageRef>;

    /// Replaces the text and keyboard of an existing message.
    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        parse_mode: ParseMode,
        keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<()>;

    /// Acknowledges a callback query so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> ApiResult<()>;

    /// Returns whether `user_id` administers `chat_id`.
    async fn is_chat_admin(&self, chat_id: ChatId, user_id: UserId) -> ApiResult<bool>;
}

/// Shared, type-erased bot handle.
pub type BoxedBot = Arc<dyn Bot>;
