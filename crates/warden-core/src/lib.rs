//! # Warden Core
//!
//! Foundation types shared by every layer of the Warden platform.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Updates**: the inbound event type delivered by the transport
//!   ([`Update`], [`UpdateKind`]) and the identities it carries
//!   ([`ChatId`], [`UserId`], [`MessageId`])
//! - **Keyboards**: inline keyboard markup attached to outbound messages
//!   ([`InlineKeyboard`], [`InlineButton`])
//! - **Errors**: the recoverable backend error taxonomy ([`ApiError`])
//!
//! ### Integration Layer
//!
//! - **Bot**: the outbound half of the transport boundary ([`Bot`]). The
//!   dispatch core never talks to the network itself; feature actions reach
//!   the backend only through this trait.
//!
//! ```text
//! ┌─────────────┐  Update   ┌────────────┐  Bot::send_message  ┌───────────┐
//! │  Transport  │──────────▶│ Dispatcher │────────────────────▶│  Backend  │
//! └─────────────┘           └────────────┘                     └───────────┘
//! ```

pub mod foundation;
pub mod integration;

pub use foundation::{
    ApiError, ApiResult, ButtonAction, CallbackQuery, Chat, ChatId, ChatKind, InlineButton,
    InlineKeyboard, Message, MessageId, MigrationNotice, ParseMode, Update, UpdateKind, User,
    UserId, escape_html,
};
pub use integration::{Bot, BoxedBot, MessageRef};

/// Prelude for common imports.
pub mod prelude {
    pub use super::foundation::*;
    pub use super::integration::*;
}
