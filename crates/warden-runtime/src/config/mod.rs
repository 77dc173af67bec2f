//! Configuration for the Warden runtime.
//!
//! Settings are layered with figment (defaults, profile file, main file,
//! `WARDEN_*` environment variables, programmatic overrides) and checked by
//! [`validate_config`] before the runtime starts.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use schema::{
    BotSettings, FloodSettings, LogFormat, LogOutput, LoggingConfig, MenuSettings,
    SpanEventConfig, WardenConfig,
};
pub use validation::validate_config;
