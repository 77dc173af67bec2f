//! # Warden
//!
//! A group-management chat bot framework.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  mpsc   ┌─────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │  Transport  │────────▶│ Runtime │────▶│ Flood gate │────▶│ Handler groups (-1, 0, …) │
//! └─────────────┘         └─────────┘     └────────────┘     └──────────────────────────┘
//!                                                                      │
//!                                                          Capability broadcast
//!                                                                      ▼
//!                                                             Module hooks
//! ```
//!
//! - **Runtime**: configuration, logging, the core handlers and the update loop
//! - **Dispatcher**: flood admission, the ordered group walk, error isolation
//! - **Modules**: feature units declaring capability hooks and handlers
//! - **Bot**: the outbound side of the transport, implemented by the embedder
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use warden::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = WardenRuntime::builder().build()?;
//!     let bot = runtime.config().bot.clone();
//!     let privileges = Privileges::new(bot.owner_id, bot.sudo_users);
//!
//!     let runtime = runtime
//!         .with_module(Bios::in_memory(privileges.clone()))
//!         .with_module(SysTools::new())
//!         .with_module(WebTools::new(privileges));
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     let transport = my_transport::connect(tx).await?;
//!     runtime.run(transport.bot(), rx).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `modules`: bundled feature modules (default)
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use warden_core as core;
pub use warden_framework as framework;
#[cfg(feature = "modules")]
pub use warden_modules as modules;
pub use warden_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use warden::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use warden_runtime::{RunStats, WardenConfig, WardenRuntime};

    // Module system
    pub use warden_framework::prelude::*;
    pub use warden_framework::DEFAULT_GROUP;

    // Transport boundary and payloads
    pub use warden_core::{
        Bot, BoxedBot, ChatId, InlineButton, InlineKeyboard, ParseMode, Update, UpdateKind, User,
        UserId, escape_html,
    };

    // Bundled modules
    #[cfg(feature = "modules")]
    pub use warden_modules::{Bios, Privileges, SysTools, WebTools};
}
