//! Backend error taxonomy.
//!
//! Every call a feature action makes through [`Bot`](crate::Bot) can fail
//! with an [`ApiError`]. These are *recoverable*: the dispatch loop catches
//! them at the per-handler boundary, routes them to the error path and keeps
//! walking the remaining handler groups.

use thiserror::Error;

use crate::foundation::update::ChatId;

// =============================================================================
// API Errors
// =============================================================================

/// Errors reported by the messaging backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The bot lacks permission (kicked, blocked by the user, not an admin).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend rejected a malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request did not complete in time.
    #[error("request timed out")]
    TimedOut,

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The target chat was upgraded and now lives under a new id.
    #[error("chat migrated to {new_chat_id}")]
    ChatMigrated {
        /// The id that supersedes the one used in the request.
        new_chat_id: ChatId,
    },

    /// Any other backend-reported failure.
    #[error("{0}")]
    Other(String),
}

/// Bad-request descriptions the backend returns for harmless races, e.g. a
/// user double-tapping a menu button.
const BENIGN_DESCRIPTIONS: &[&str] = &["message is not modified", "query_id_invalid"];

impl ApiError {
    /// Creates a bad-request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Short category name used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            Self::TimedOut => "timed_out",
            Self::Network(_) => "network",
            Self::ChatMigrated { .. } => "chat_migrated",
            Self::Other(_) => "other",
        }
    }

    /// Returns `true` for responses that carry no real failure.
    pub fn is_benign(&self) -> bool {
        match self {
            Self::BadRequest(desc) => {
                let desc = desc.to_lowercase();
                BENIGN_DESCRIPTIONS.iter().any(|b| desc.contains(b))
            }
            _ => false,
        }
    }

    /// Returns `true` if retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TimedOut | Self::Network(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;
