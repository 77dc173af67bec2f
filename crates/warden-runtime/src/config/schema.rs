//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use warden_core::UserId;
use warden_framework::{FloodConfig, MenuLayout};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WardenConfig {
    /// Identity and privilege settings.
    #[serde(default)]
    pub bot: BotSettings,

    /// Per-chat flood control.
    #[serde(default)]
    pub flood: FloodSettings,

    /// Help and settings menu geometry.
    #[serde(default)]
    pub menu: MenuSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// [bot]
// =============================================================================

/// Bot-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BotSettings {
    /// The bot owner. Owner-only commands are refused while unset.
    #[serde(default)]
    pub owner_id: Option<UserId>,

    /// Users with elevated rights (the owner is always included).
    #[serde(default)]
    pub sudo_users: Vec<UserId>,

    /// Users allowed to help with support tasks.
    #[serde(default)]
    pub support_users: Vec<UserId>,

    /// Accept `!` as a command prefix in addition to `/`.
    #[serde(default)]
    pub allow_excl: bool,

    /// Extra text appended to the `/start` message.
    #[serde(default)]
    pub info_start: Option<String>,

    /// Extra text appended to the `/help` message.
    #[serde(default)]
    pub info_help: Option<String>,
}

impl BotSettings {
    /// Command prefixes accepted by the dispatcher.
    pub fn command_prefixes(&self) -> Vec<char> {
        if self.allow_excl {
            vec!['/', '!']
        } else {
            vec!['/']
        }
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner_id == Some(user)
    }

    /// Returns `true` for the owner and every sudo user.
    pub fn is_sudo(&self, user: UserId) -> bool {
        self.is_owner(user) || self.sudo_users.contains(&user)
    }

    /// Owner and sudo users, deduplicated.
    pub fn sudoers(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.owner_id.into_iter().collect();
        for user in &self.sudo_users {
            if !users.contains(user) {
                users.push(*user);
            }
        }
        users
    }
}

// =============================================================================
// [flood]
// =============================================================================

/// Flood gate tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloodSettings {
    /// Counting window in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Updates admitted per chat per window.
    #[serde(default = "default_threshold")]
    pub threshold: u32,

    /// Number of independently locked shards.
    #[serde(default = "default_shards")]
    pub shards: usize,

    /// Upper bound on tracked chats.
    #[serde(default = "default_max_tracked_chats")]
    pub max_tracked_chats: usize,

    /// How often expired entries are swept, in seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for FloodSettings {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            threshold: default_threshold(),
            shards: default_shards(),
            max_tracked_chats: default_max_tracked_chats(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl FloodSettings {
    /// Converts to the flood gate's own config.
    pub fn to_flood_config(&self) -> FloodConfig {
        FloodConfig {
            window: Duration::from_millis(self.window_ms),
            threshold: self.threshold,
            shards: self.shards,
            max_tracked_chats: self.max_tracked_chats,
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_window_ms() -> u64 {
    2000
}

fn default_threshold() -> u32 {
    10
}

fn default_shards() -> usize {
    16
}

fn default_max_tracked_chats() -> usize {
    10_000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

// =============================================================================
// [menu]
// =============================================================================

/// Menu geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            columns: default_columns(),
        }
    }
}

impl MenuSettings {
    pub fn layout(&self) -> MenuLayout {
        MenuLayout {
            page_size: self.page_size,
            columns: self.columns,
        }
    }
}

fn default_page_size() -> usize {
    10
}

fn default_columns() -> usize {
    2
}

// =============================================================================
// [logging]
// =============================================================================

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact otherwise.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Required when `output` is `file`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Per-target levels, e.g. `warden_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, String>,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            span_events: SpanEventConfig::default(),
            filters: HashMap::new(),
            thread_ids: false,
            file_location: false,
        }
    }
}

impl LoggingConfig {
    /// The configured level, or `None` if it does not parse.
    pub fn tracing_level(&self) -> Option<tracing::Level> {
        self.level.parse().ok()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
