//! Error types for the Warden framework.

use thiserror::Error;

use warden_core::ApiError;

/// Boxed error used for module faults and hook failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal errors raised while building the module registry.
///
/// Any of these stops the process from serving updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two modules share a name, compared case-insensitively.
    #[error("can't have two modules with the same name: '{0}'")]
    DuplicateModuleName(String),

    /// A required descriptor field is empty.
    #[error("module descriptor is missing required field '{0}'")]
    MissingField(&'static str),

    /// The name contains characters reserved by the callback-data encoding.
    #[error("module name '{0}' contains one of the reserved characters '(', ')', ','")]
    InvalidName(String),
}

/// Failure of a handler action.
///
/// The two variants take different paths through the dispatch loop: backend
/// errors go to the error handler, faults are only logged. Neither escapes
/// the per-group boundary.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The messaging backend rejected a call.
    #[error(transparent)]
    Backend(#[from] ApiError),

    /// Any other failure inside the module.
    #[error("module fault: {0}")]
    Fault(BoxError),
}

impl ActionError {
    /// Wraps any error as a module fault.
    pub fn fault(err: impl Into<BoxError>) -> Self {
        Self::Fault(err.into())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Fault(Box::new(err))
    }
}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        Self::Fault(Box::new(err))
    }
}

/// Result type for registry construction.
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_converts_to_backend() {
        fn call() -> Result<(), ActionError> {
            Err(ApiError::TimedOut)?
        }
        assert!(matches!(call(), Err(ActionError::Backend(ApiError::TimedOut))));
    }

    #[test]
    fn test_fault_from_message() {
        let err = ActionError::fault("repository unavailable");
        assert_eq!(err.to_string(), "module fault: repository unavailable");
    }
}
