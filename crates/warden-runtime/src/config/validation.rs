//! Checks run on a loaded configuration before the runtime uses it.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FloodSettings, LogOutput, LoggingConfig, MenuSettings, WardenConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates every section; the first problem found is returned.
pub fn validate_config(config: &WardenConfig) -> ConfigResult<()> {
    validate_flood(&config.flood)?;
    validate_menu(&config.menu)?;
    validate_logging(&config.logging)
}

fn nonzero(key: &str, value: u64) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::invalid(key, "must be greater than 0"));
    }
    Ok(())
}

fn validate_flood(flood: &FloodSettings) -> ConfigResult<()> {
    nonzero("flood.window_ms", flood.window_ms)?;
    nonzero("flood.threshold", u64::from(flood.threshold))?;
    nonzero("flood.shards", flood.shards as u64)?;
    nonzero("flood.sweep_interval_secs", flood.sweep_interval_secs)?;
    if flood.max_tracked_chats < flood.shards {
        return Err(ConfigError::invalid(
            "flood.max_tracked_chats",
            format!("must be at least flood.shards ({})", flood.shards),
        ));
    }
    Ok(())
}

fn validate_menu(menu: &MenuSettings) -> ConfigResult<()> {
    nonzero("menu.page_size", menu.page_size as u64)?;
    nonzero("menu.columns", menu.columns as u64)
}

fn validate_level(key: &str, level: &str) -> ConfigResult<()> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        return Ok(());
    }
    Err(ConfigError::invalid(
        key,
        format!("unknown level `{level}`, expected one of {}", LOG_LEVELS.join(", ")),
    ))
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    validate_level("logging.level", &logging.level)?;

    for (target, level) in &logging.filters {
        if target.trim().is_empty() {
            return Err(ConfigError::invalid("logging.filters", "empty target"));
        }
        validate_level(&format!("logging.filters.{target}"), level)?;
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::Missing("logging.file_path"));
    }
    Ok(())
}
