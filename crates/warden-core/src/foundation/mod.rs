//! Foundation layer - inbound events, identities and outbound markup.

pub mod error;
pub mod keyboard;
pub mod update;

pub use error::{ApiError, ApiResult};
pub use keyboard::{ButtonAction, InlineButton, InlineKeyboard, ParseMode, escape_html};
pub use update::{
    CallbackQuery, Chat, ChatId, ChatKind, Message, MessageId, MigrationNotice, Update,
    UpdateKind, User, UserId,
};
