//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why the configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file extension names a format that is unknown or not compiled in.
    #[error("Unsupported configuration format `.{extension}`: {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// A source could not be read or does not fit the schema.
    #[error("Failed to extract configuration: {0}")]
    Extract(#[source] Box<figment::Error>),

    #[error("Invalid `{key}`: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Missing required configuration field `{0}`")]
    Missing(&'static str),
}

impl ConfigError {
    pub(crate) fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The offending key, for validation failures.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Invalid { key, .. } => Some(key),
            Self::Missing(key) => Some(key),
            _ => None,
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Extract(Box::new(err))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
