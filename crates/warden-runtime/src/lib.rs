//! Warden Runtime - bootstrapping layer for the Warden chat-bot platform.
//!
//! This crate provides:
//! - Layered configuration (`config`): defaults, TOML/YAML files, `WARDEN_*`
//!   environment variables and programmatic overrides via figment
//! - Logging setup (`logging`) on top of `tracing-subscriber`
//! - The core handlers every bot carries (`builtins`): `/start`, `/help`,
//!   `/settings`, chat migration, `/gdpr`, `/info`, `/stats`, `/export`, `/import`
//! - The update loop (`WardenRuntime`) with flood sweeping and graceful shutdown
//!
//! ```ignore
//! use warden_runtime::WardenRuntime;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = WardenRuntime::builder().build()?.with_module(MyModule::new());
//!
//!     let (tx, rx) = tokio::sync::mpsc::channel(256);
//!     let bot = my_transport::connect(tx).await?;
//!
//!     // Run until Ctrl+C or until the transport drops `tx`
//!     runtime.run(bot, rx).await?;
//!     Ok(())
//! }
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use builtins::{CORE_GROUP, CoreSettings, MIGRATION_GROUP, escape_html, register_builtins};
pub use config::{
    BotSettings, ConfigError, ConfigLoader, ConfigResult, FloodSettings, LoggingConfig,
    MenuSettings, WardenConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{RunStats, RuntimeBuilder, WardenRuntime};

// Handlers log through `tracing`; `LoggingBuilder` takes `tracing_subscriber` types.
pub use tracing;
pub use tracing_subscriber;
