//! Per-dispatch context handed to predicates and actions.
//!
//! One [`DispatchContext`] is created for every admitted update and shared
//! behind an `Arc` with every handler that runs for it. It is discarded
//! when the dispatch pass (and any detached action) finishes.

use std::sync::{Arc, OnceLock};

use warden_core::{
    ApiResult, BoxedBot, CallbackQuery, Chat, ChatId, InlineKeyboard, MessageRef, ParseMode,
    Update, User,
};

use crate::broadcast::CapabilityBroadcast;
use crate::command::CommandInvocation;
use crate::module::ModuleRegistry;

/// The context object passed to handlers during update processing.
pub struct DispatchContext {
    update: Arc<Update>,
    bot: BoxedBot,
    registry: Arc<ModuleRegistry>,
    prefixes: Arc<[char]>,
    /// Parsed lazily on first access; `None` inside when the text is not a
    /// command addressed to this bot.
    command: OnceLock<Option<CommandInvocation>>,
}

impl DispatchContext {
    /// Creates a context for one update.
    pub fn new(
        update: Arc<Update>,
        bot: BoxedBot,
        registry: Arc<ModuleRegistry>,
        prefixes: Arc<[char]>,
    ) -> Self {
        Self {
            update,
            bot,
            registry,
            prefixes,
            command: OnceLock::new(),
        }
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    /// Returns a shared handle to the update.
    pub fn update_arc(&self) -> Arc<Update> {
        Arc::clone(&self.update)
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    /// Returns a broadcaster over the module registry.
    pub fn broadcast(&self) -> CapabilityBroadcast {
        CapabilityBroadcast::new(Arc::clone(&self.registry))
    }

    /// The command carried by the update text, if it is addressed to this bot.
    pub fn command(&self) -> Option<&CommandInvocation> {
        self.command
            .get_or_init(|| {
                let text = self.update.text()?;
                let cmd = CommandInvocation::parse(text, &self.prefixes)?;
                cmd.is_addressed_to(self.bot.username()).then_some(cmd)
            })
            .as_ref()
    }

    /// Whitespace-separated command arguments, empty when there is no command.
    pub fn args(&self) -> Vec<&str> {
        self.command().map(CommandInvocation::args).unwrap_or_default()
    }

    pub fn chat(&self) -> Option<&Chat> {
        self.update.chat.as_ref()
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        self.update.chat_id()
    }

    pub fn user(&self) -> Option<&User> {
        self.update.from.as_ref()
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.update.callback_query()
    }

    /// Sends `text` to the originating chat.
    ///
    /// Updates without a chat never reach actions, so a missing chat is
    /// reported as a bad request rather than a panic.
    pub async fn reply(
        &self,
        text: &str,
        parse_mode: ParseMode,
        keyboard: Option<&InlineKeyboard>,
    ) -> ApiResult<MessageRef> {
        let chat_id = self
            .chat_id()
            .ok_or_else(|| warden_core::ApiError::bad_request("update has no chat"))?;
        self.bot
            .send_message(chat_id, text, parse_mode, keyboard)
            .await
    }

    /// Sends plain `text` to the originating chat.
    pub async fn reply_text(&self, text: &str) -> ApiResult<MessageRef> {
        self.reply(text, ParseMode::Plain, None).await
    }
}

impl std::fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchContext")
            .field("update_id", &self.update.update_id)
            .field("kind", &self.update.kind_name())
            .field("chat_id", &self.update.chat_id())
            .finish_non_exhaustive()
    }
}
