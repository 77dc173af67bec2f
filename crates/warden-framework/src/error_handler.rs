//! The error-dispatch path.
//!
//! Backend errors raised by actions, and transport errors surfaced as
//! updates, are handed to the dispatcher's [`ErrorHandler`]. The default
//! implementation only logs them.

use async_trait::async_trait;
use tracing::{debug, error, warn};

use warden_core::{ApiError, BoxedBot, Update};

use crate::handler::{ActionResult, Outcome};

/// Receives backend errors that escaped an action.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Handles `error`.
    ///
    /// `update` is `None` for transport errors that were not caused by any
    /// user update. Returning [`Outcome::StopGroupWalk`] ends the current
    /// walk; returning an error is logged and otherwise ignored.
    async fn handle(&self, update: Option<&Update>, error: &ApiError, bot: &BoxedBot)
    -> ActionResult;
}

/// Logs each error at a level matching its category.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

#[async_trait]
impl ErrorHandler for LoggingErrorHandler {
    async fn handle(
        &self,
        update: Option<&Update>,
        err: &ApiError,
        _bot: &BoxedBot,
    ) -> ActionResult {
        let update_id = update.map(|u| u.update_id);
        let chat_id = update.and_then(Update::chat_id).map(|c| c.0);

        if err.is_benign() {
            debug!(?update_id, ?chat_id, error = %err, "Ignoring benign backend response");
            return Ok(Outcome::Continue);
        }

        match err {
            ApiError::Unauthorized(_) => {
                warn!(?update_id, ?chat_id, kind = err.kind(), error = %err, "Not authorized")
            }
            ApiError::BadRequest(_) => {
                warn!(?update_id, ?chat_id, kind = err.kind(), error = %err, "Malformed request")
            }
            ApiError::TimedOut | ApiError::Network(_) => {
                warn!(?update_id, ?chat_id, kind = err.kind(), error = %err, "Slow or broken connection")
            }
            ApiError::ChatMigrated { new_chat_id } => {
                warn!(?update_id, ?chat_id, new_chat_id = new_chat_id.0, "Chat migrated")
            }
            ApiError::Other(_) => {
                error!(?update_id, ?chat_id, kind = err.kind(), error = %err, "Backend error")
            }
        }
        Ok(Outcome::Continue)
    }
}
