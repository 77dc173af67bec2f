//! Errors raised inside feature modules.

use thiserror::Error;

use warden_framework::ActionError;

#[derive(Debug, Error)]
pub enum ModuleError {
    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// `ping` ran but reported no round-trip time.
    #[error("ping failed: {0}")]
    Ping(String),

    /// A host argument that cannot be handed to `ping`.
    #[error("invalid host: {0:?}")]
    InvalidHost(String),

    #[error("could not run command: {0}")]
    Io(#[from] std::io::Error),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ModuleResult<T> = Result<T, ModuleError>;

impl From<ModuleError> for ActionError {
    fn from(err: ModuleError) -> Self {
        ActionError::fault(err)
    }
}
