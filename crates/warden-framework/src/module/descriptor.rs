//! Module descriptors and their capability hooks.
//!
//! A descriptor states which cross-cutting capabilities a feature module
//! takes part in. Every hook is an optional function value; a module opts
//! into a capability by setting it, and the registry indexes modules by the
//! hooks present.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;

use warden_core::{ChatId, InlineButton, UserId};

use crate::error::BoxError;

/// Cross-cutting behaviors a module may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Contributes a page to the help menu.
    Help,
    /// Moves per-chat state when a chat migrates.
    Migrate,
    /// Renders the module's settings for a chat.
    ChatSettings,
    /// Renders the module's settings for a user.
    UserSettings,
    /// Erases everything stored about a user.
    Gdpr,
    /// Adds lines to `/info`.
    UserInfo,
    /// Adds lines to `/stats`.
    Stats,
    /// Restores per-chat data from a backup.
    DataImport,
    /// Produces per-chat data for a backup.
    DataExport,
}

impl Capability {
    /// All capabilities, in declaration order.
    pub const ALL: [Capability; 9] = [
        Self::Help,
        Self::Migrate,
        Self::ChatSettings,
        Self::UserSettings,
        Self::Gdpr,
        Self::UserInfo,
        Self::Stats,
        Self::DataImport,
        Self::DataExport,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Migrate => "migrate",
            Self::ChatSettings => "chat_settings",
            Self::UserSettings => "user_settings",
            Self::Gdpr => "gdpr",
            Self::UserInfo => "user_info",
            Self::Stats => "stats",
            Self::DataImport => "data_import",
            Self::DataExport => "data_export",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Hook types
// =============================================================================

/// Future returned by every hook.
pub type HookFuture<T> = BoxFuture<'static, Result<T, BoxError>>;

/// `(old_chat, new_chat)`
pub type MigrateHook = Arc<dyn Fn(ChatId, ChatId) -> HookFuture<()> + Send + Sync>;
/// `(chat, user) -> settings text`
pub type ChatSettingsHook = Arc<dyn Fn(ChatId, UserId) -> HookFuture<String> + Send + Sync>;
/// `user -> settings text`
pub type UserSettingsHook = Arc<dyn Fn(UserId) -> HookFuture<String> + Send + Sync>;
pub type GdprHook = Arc<dyn Fn(UserId) -> HookFuture<()> + Send + Sync>;
/// `user -> info text`, `None` when the module knows nothing about the user.
pub type UserInfoHook = Arc<dyn Fn(UserId) -> HookFuture<Option<String>> + Send + Sync>;
pub type StatsHook = Arc<dyn Fn() -> HookFuture<String> + Send + Sync>;
pub type ExportHook = Arc<dyn Fn(ChatId) -> HookFuture<Value> + Send + Sync>;
pub type ImportHook = Arc<dyn Fn(ChatId, Value) -> HookFuture<()> + Send + Sync>;

// =============================================================================
// ModuleDescriptor
// =============================================================================

/// Static description of a feature module.
///
/// ```rust,ignore
/// let descriptor = ModuleDescriptor::new("Bios")
///     .help("/me: get your info")
///     .on_gdpr(move |user| {
///         let repo = repo.clone();
///         async move { Ok(repo.forget(user).await?) }
///     });
/// ```
#[derive(Clone, Default)]
pub struct ModuleDescriptor {
    name: String,
    help: Option<String>,
    help_keyboard: Vec<Vec<InlineButton>>,
    migrate: Option<MigrateHook>,
    chat_settings: Option<ChatSettingsHook>,
    user_settings: Option<UserSettingsHook>,
    gdpr: Option<GdprHook>,
    user_info: Option<UserInfoHook>,
    stats: Option<StatsHook>,
    import: Option<ImportHook>,
    export: Option<ExportHook>,
}

macro_rules! hook_setter {
    ($(#[$doc:meta])* $fn:ident, $field:ident, ($($arg:ident: $ty:ty),*) -> $out:ty) => {
        $(#[$doc])*
        pub fn $fn<F, Fut>(mut self, hook: F) -> Self
        where
            F: Fn($($ty),*) -> Fut + Send + Sync + 'static,
            Fut: Future<Output = Result<$out, BoxError>> + Send + 'static,
        {
            self.$field = Some(Arc::new(move |$($arg),*| hook($($arg),*).boxed()));
            self
        }
    };
}

impl ModuleDescriptor {
    /// Creates a descriptor with no capabilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Display name shown in menus.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowercased name used for lookups and callback data.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Sets the help text (builder pattern).
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// Adds a button row shown under the help page (builder pattern).
    pub fn help_keyboard_row(mut self, row: Vec<InlineButton>) -> Self {
        self.help_keyboard.push(row);
        self
    }

    hook_setter!(
        /// Sets the migration hook (builder pattern).
        on_migrate, migrate, (old: ChatId, new: ChatId) -> ()
    );
    hook_setter!(
        /// Sets the chat-settings hook (builder pattern).
        on_chat_settings, chat_settings, (chat: ChatId, user: UserId) -> String
    );
    hook_setter!(
        /// Sets the user-settings hook (builder pattern).
        on_user_settings, user_settings, (user: UserId) -> String
    );
    hook_setter!(
        /// Sets the GDPR-erasure hook (builder pattern).
        on_gdpr, gdpr, (user: UserId) -> ()
    );
    hook_setter!(
        /// Sets the user-info hook (builder pattern).
        on_user_info, user_info, (user: UserId) -> Option<String>
    );
    hook_setter!(
        /// Sets the stats hook (builder pattern).
        on_stats, stats, () -> String
    );
    hook_setter!(
        /// Sets the backup-import hook (builder pattern).
        on_import, import, (chat: ChatId, data: Value) -> ()
    );
    hook_setter!(
        /// Sets the backup-export hook (builder pattern).
        on_export, export, (chat: ChatId) -> Value
    );

    /// Returns `true` if the module implements `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Help => self.help_text().is_some(),
            Capability::Migrate => self.migrate.is_some(),
            Capability::ChatSettings => self.chat_settings.is_some(),
            Capability::UserSettings => self.user_settings.is_some(),
            Capability::Gdpr => self.gdpr.is_some(),
            Capability::UserInfo => self.user_info.is_some(),
            Capability::Stats => self.stats.is_some(),
            Capability::DataImport => self.import.is_some(),
            Capability::DataExport => self.export.is_some(),
        }
    }

    /// Capabilities this module implements.
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// Help text, if present and non-empty.
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref().filter(|h| !h.trim().is_empty())
    }

    pub fn help_keyboard(&self) -> &[Vec<InlineButton>] {
        &self.help_keyboard
    }

    pub fn migrate_hook(&self) -> Option<&MigrateHook> {
        self.migrate.as_ref()
    }

    pub fn chat_settings_hook(&self) -> Option<&ChatSettingsHook> {
        self.chat_settings.as_ref()
    }

    pub fn user_settings_hook(&self) -> Option<&UserSettingsHook> {
        self.user_settings.as_ref()
    }

    pub fn gdpr_hook(&self) -> Option<&GdprHook> {
        self.gdpr.as_ref()
    }

    pub fn user_info_hook(&self) -> Option<&UserInfoHook> {
        self.user_info.as_ref()
    }

    pub fn stats_hook(&self) -> Option<&StatsHook> {
        self.stats.as_ref()
    }

    pub fn import_hook(&self) -> Option<&ImportHook> {
        self.import.as_ref()
    }

    pub fn export_hook(&self) -> Option<&ExportHook> {
        self.export.as_ref()
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
