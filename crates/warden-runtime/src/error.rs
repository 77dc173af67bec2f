//! Runtime error types.

use thiserror::Error;

use warden_framework::RegistryError;

use crate::config::ConfigError;

/// Errors that stop the runtime from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Two modules share a name, or a descriptor is incomplete.
    #[error("Module registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
