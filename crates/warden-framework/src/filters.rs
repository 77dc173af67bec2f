//! Predicate builders for common update shapes.
//!
//! A [`Predicate`] decides whether a handler wants an update. Predicates are
//! evaluated synchronously during matching, so they must be cheap and free
//! of side effects; anything that needs I/O belongs in the action.
//!
//! ```rust,ignore
//! use warden_framework::filters::{command, group_chat};
//!
//! let pred = command(&["settings"]).and(group_chat());
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use warden_core::{ChatId, ChatKind, UpdateKind, UserId};

use crate::context::DispatchContext;

/// A type-erased check function.
pub type CheckFn = Arc<dyn Fn(&DispatchContext) -> bool + Send + Sync>;

/// A composable, cheaply clonable update predicate.
#[derive(Clone)]
pub struct Predicate(CheckFn);

impl Predicate {
    /// Wraps a closure.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&DispatchContext) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    /// Matches every update.
    pub fn always() -> Self {
        Self::new(|_| true)
    }

    /// Evaluates the predicate.
    pub fn matches(&self, ctx: &DispatchContext) -> bool {
        (self.0)(ctx)
    }

    /// Both predicates must match. `other` is not evaluated if `self` fails.
    pub fn and(self, other: Predicate) -> Self {
        Self::new(move |ctx| self.matches(ctx) && other.matches(ctx))
    }

    /// Either predicate may match.
    pub fn or(self, other: Predicate) -> Self {
        Self::new(move |ctx| self.matches(ctx) || other.matches(ctx))
    }

    /// Inverts the predicate.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::new(move |ctx| !self.matches(ctx))
    }
}

impl std::fmt::Debug for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate")
    }
}

// =============================================================================
// Update kinds
// =============================================================================

/// Matches new messages.
pub fn message() -> Predicate {
    Predicate::new(|ctx| matches!(ctx.update().kind, UpdateKind::Message(_)))
}

/// Matches edited messages.
pub fn edited_message() -> Predicate {
    Predicate::new(|ctx| matches!(ctx.update().kind, UpdateKind::EditedMessage(_)))
}

/// Matches chat-migration notices.
pub fn migration() -> Predicate {
    Predicate::new(|ctx| ctx.update().migration().is_some())
}

/// Matches a new message carrying one of `names` as its command.
///
/// Names are compared case-insensitively. Commands addressed to another bot
/// (`/help@other_bot`) never match.
pub fn command(names: &[&str]) -> Predicate {
    let names: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    message().and(Predicate::new(move |ctx| {
        ctx.command().is_some_and(|cmd| names.contains(&cmd.name))
    }))
}

/// Matches callback queries whose data starts with `prefix`.
pub fn callback_prefix(prefix: &'static str) -> Predicate {
    Predicate::new(move |ctx| {
        ctx.callback_query()
            .and_then(|q| q.data.as_deref())
            .is_some_and(|data| data.starts_with(prefix))
    })
}

// =============================================================================
// Chats and senders
// =============================================================================

/// Matches updates from one-to-one chats.
pub fn private_chat() -> Predicate {
    Predicate::new(|ctx| ctx.chat().is_some_and(|c| c.kind == ChatKind::Private))
}

/// Matches updates from groups and supergroups.
pub fn group_chat() -> Predicate {
    Predicate::new(|ctx| {
        ctx.chat()
            .is_some_and(|c| matches!(c.kind, ChatKind::Group | ChatKind::Supergroup))
    })
}

/// Matches updates sent by one of `users`.
pub fn from_users(users: impl IntoIterator<Item = UserId>) -> Predicate {
    let users: HashSet<UserId> = users.into_iter().collect();
    Predicate::new(move |ctx| ctx.update().user_id().is_some_and(|id| users.contains(&id)))
}

/// Matches updates from one of `chats`.
pub fn in_chats(chats: impl IntoIterator<Item = ChatId>) -> Predicate {
    let chats: HashSet<ChatId> = chats.into_iter().collect();
    Predicate::new(move |ctx| ctx.chat_id().is_some_and(|id| chats.contains(&id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{callback_update, context, message_update};
    use warden_core::{Chat, ChatId, MigrationNotice, Update, User};

    #[test]
    fn test_command_predicate() {
        let pred = command(&["Help", "start"]);
        assert!(pred.matches(&context(message_update(1, "/help"))));
        assert!(pred.matches(&context(message_update(1, "/START now"))));
        assert!(pred.matches(&context(message_update(1, "/help@test_bot"))));
        assert!(!pred.matches(&context(message_update(1, "/help@other_bot"))));
        assert!(!pred.matches(&context(message_update(1, "help"))));
        assert!(!pred.matches(&context(message_update(1, "/helpme"))));
    }

    #[test]
    fn test_command_ignores_edits() {
        let edited = Update::new(
            1,
            UpdateKind::EditedMessage(warden_core::Message::text(1, "/help")),
        )
        .in_chat(Chat::private(1));
        assert!(!command(&["help"]).matches(&context(edited.clone())));
        assert!(edited_message().matches(&context(edited)));
    }

    #[test]
    fn test_callback_prefix() {
        let pred = callback_prefix("help_");
        assert!(pred.matches(&context(callback_update(1, "help_back"))));
        assert!(!pred.matches(&context(callback_update(1, "stngs_back(1)"))));
        assert!(!pred.matches(&context(message_update(1, "help_back"))));
    }

    #[test]
    fn test_chat_kind_and_combinators() {
        let private = context(message_update(5, "/x"));
        let group = context(message_update(-5, "/x"));

        assert!(private_chat().matches(&private));
        assert!(!private_chat().matches(&group));
        assert!(group_chat().matches(&group));
        assert!(private_chat().or(group_chat()).matches(&group));
        assert!(!private_chat().and(group_chat()).matches(&group));
        assert!(private_chat().not().matches(&group));
        assert!(Predicate::always().matches(&group));
    }

    #[test]
    fn test_sender_and_chat_sets() {
        let update = message_update(-7, "/stats").sent_by(User::new(99, "Sudo"));
        let ctx = context(update);
        assert!(from_users([UserId(99), UserId(1)]).matches(&ctx));
        assert!(!from_users([UserId(1)]).matches(&ctx));
        assert!(in_chats([ChatId(-7)]).matches(&ctx));
        assert!(!in_chats(Vec::<ChatId>::new()).matches(&ctx));
    }

    #[test]
    fn test_migration_predicate() {
        let update = Update::new(1, UpdateKind::Migration(MigrationNotice::to(ChatId(-2))))
            .in_chat(Chat::group(-1, "old"));
        assert!(migration().matches(&context(update)));
        assert!(!migration().matches(&context(message_update(1, "hi"))));
    }
}
