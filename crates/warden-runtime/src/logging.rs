//! Logging setup on top of `tracing-subscriber`.
//!
//! The runtime calls [`init_from_config`] with the `[logging]` section when it
//! is built. Embedders that install their own subscriber first keep it; the
//! runtime never replaces a global subscriber.
//!
//! ```rust,ignore
//! use warden_runtime::logging::LoggingBuilder;
//! use tracing_subscriber::fmt::format::FmtSpan;
//!
//! LoggingBuilder::new()
//!     .directive("warden_framework::flood=trace")
//!     .span_events(FmtSpan::NEW | FmtSpan::CLOSE)
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{Level, Subscriber, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

const DEFAULT_LOG_FILE: &str = "warden.log";

/// HTTP client internals are noisy at debug level; `/ip` goes through them.
const QUIET_TARGETS: [&str; 3] = ["hyper=warn", "hyper_util=warn", "reqwest=warn"];

impl SpanEventConfig {
    /// The span events as a `tracing-subscriber` flag set.
    pub fn to_fmt_span(&self) -> FmtSpan {
        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
    }
}

/// Initializes logging from the `[logging]` section.
///
/// A subscriber that is already installed is left in place.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A builder for the global tracing subscriber.
#[derive(Debug)]
pub struct LoggingBuilder {
    level: Level,
    directives: Vec<String>,
    quiet_dependencies: bool,
    span_events: FmtSpan,
    format: LogFormat,
    output: LogOutput,
    file_path: Option<PathBuf>,
    with_target: bool,
    with_thread_ids: bool,
    with_location: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            directives: Vec::new(),
            quiet_dependencies: true,
            span_events: FmtSpan::NONE,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            with_target: true,
            with_thread_ids: false,
            with_location: false,
        }
    }

    /// Creates a builder from a [`LoggingConfig`].
    ///
    /// Per-target filters are applied in target order so the resulting
    /// filter does not depend on map iteration order.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut filters: Vec<_> = config.filters.iter().collect();
        filters.sort();

        Self {
            level: config.tracing_level().unwrap_or(Level::INFO),
            directives: filters
                .into_iter()
                .map(|(target, level)| format!("{target}={}", level.to_lowercase()))
                .collect(),
            span_events: config.span_events.to_fmt_span(),
            format: config.format,
            output: config.output,
            file_path: config.file_path.clone(),
            with_thread_ids: config.thread_ids,
            with_location: config.file_location,
            ..Self::new()
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Adds a filter directive such as `warden_framework::dispatcher=debug`.
    pub fn directive(mut self, directive: impl Into<String>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Whether HTTP client crates are capped at `warn` (on by default).
    pub fn quiet_dependencies(mut self, quiet: bool) -> Self {
        self.quiet_dependencies = quiet;
        self
    }

    pub fn span_events(mut self, events: FmtSpan) -> Self {
        self.span_events = events;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file names and line numbers.
    pub fn with_location(mut self, enabled: bool) -> Self {
        self.with_location = enabled;
        self
    }

    /// Every directive the filter is built from, in application order.
    fn all_directives(&self) -> Vec<String> {
        let quiet: &[&str] = if self.quiet_dependencies {
            &QUIET_TARGETS
        } else {
            &[]
        };
        quiet
            .iter()
            .map(|d| d.to_string())
            .chain(self.directives.iter().cloned())
            .collect()
    }

    /// `RUST_LOG` replaces the configured level; directives are added on top.
    fn build_filter(&self) -> EnvFilter {
        let base = self.level.as_str().to_lowercase();
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));

        for directive in self.all_directives() {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => warn!(%directive, error = %e, "Ignoring bad log directive"),
            }
        }
        filter
    }

    fn writer(&self) -> BoxMakeWriter {
        match (self.output, &self.file_path) {
            (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
            (LogOutput::File, Some(path)) => {
                let dir = path
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let name = path
                    .file_name()
                    .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
                BoxMakeWriter::new(tracing_appender::rolling::never(dir, name))
            }
            // Validation rejects `file` without a path; stdout if it slips through.
            (LogOutput::Stdout, _) | (LogOutput::File, None) => BoxMakeWriter::new(std::io::stdout),
        }
    }

    fn fmt_layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(self.writer())
            .with_span_events(self.span_events.clone())
            .with_target(self.with_target)
            .with_thread_ids(self.with_thread_ids)
            .with_file(self.with_location)
            .with_line_number(self.with_location);

        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            #[cfg(not(feature = "json-log"))]
            LogFormat::Json => layer.compact().boxed(),
        }
    }

    /// Installs the subscriber, ignoring an already-installed one.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Installs the subscriber.
    pub fn try_init(self) -> Result<(), TryInitError> {
        tracing_subscriber::registry()
            .with(self.fmt_layer())
            .with(self.build_filter())
            .try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let mut config = LoggingConfig {
            level: "debug".to_string(),
            thread_ids: true,
            file_location: true,
            span_events: SpanEventConfig {
                new: true,
                close: true,
                ..Default::default()
            },
            ..Default::default()
        };
        config
            .filters
            .insert("warden_runtime".to_string(), "WARN".to_string());
        config
            .filters
            .insert("warden_framework".to_string(), "TRACE".to_string());

        let builder = LoggingBuilder::from_config(&config);
        assert_eq!(builder.level, Level::DEBUG);
        assert_eq!(builder.span_events, FmtSpan::NEW | FmtSpan::CLOSE);
        assert!(builder.with_thread_ids);
        assert!(builder.with_location);
        assert_eq!(
            builder.directives,
            vec!["warden_framework=trace", "warden_runtime=warn"]
        );
    }

    #[test]
    fn test_unparsable_level_falls_back_to_info() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(LoggingBuilder::from_config(&config).level, Level::INFO);
    }

    #[test]
    fn test_quiet_targets_precede_user_directives() {
        let builder = LoggingBuilder::new().directive("reqwest=debug");
        let directives = builder.all_directives();
        assert_eq!(directives.first().map(String::as_str), Some("hyper=warn"));
        assert_eq!(directives.last().map(String::as_str), Some("reqwest=debug"));

        let loud = LoggingBuilder::new().quiet_dependencies(false);
        assert!(loud.all_directives().is_empty());
    }
}
