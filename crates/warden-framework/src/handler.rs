//! Handlers: a predicate paired with an async action.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::context::DispatchContext;
use crate::error::ActionError;
use crate::filters::Predicate;

/// What the dispatch loop should do after an action finishes.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    /// Move on to the next handler group.
    #[default]
    Continue,
    /// Stop the walk; no later group sees this update.
    StopGroupWalk,
}

/// Result of a handler action.
pub type ActionResult = Result<Outcome, ActionError>;

/// A type-erased async action.
pub type ActionFn =
    Arc<dyn Fn(Arc<DispatchContext>) -> BoxFuture<'static, ActionResult> + Send + Sync>;

/// A predicate plus the action to run when it matches.
///
/// Handlers are stateless from the dispatcher's point of view; anything an
/// action needs is captured from its feature module.
#[derive(Clone)]
pub struct Handler {
    name: Option<String>,
    predicate: Predicate,
    action: ActionFn,
    detached: bool,
}

impl Handler {
    /// Creates a handler from a predicate and an async closure.
    ///
    /// ```rust,ignore
    /// let handler = Handler::new(command(&["ping"]), |ctx| async move {
    ///     ctx.reply_text("pong").await?;
    ///     Ok(Outcome::Continue)
    /// });
    /// ```
    pub fn new<F, Fut>(predicate: Predicate, action: F) -> Self
    where
        F: Fn(Arc<DispatchContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            name: None,
            predicate,
            action: Arc::new(move |ctx| action(ctx).boxed()),
            detached: false,
        }
    }

    /// Sets a name used in log output (builder pattern).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks the action as detached (builder pattern).
    ///
    /// A detached action is spawned once matched and the walk continues
    /// without waiting for it. It cannot stop the walk.
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Evaluates the predicate.
    pub fn matches(&self, ctx: &DispatchContext) -> bool {
        self.predicate.matches(ctx)
    }

    /// Starts the action.
    pub fn invoke(&self, ctx: Arc<DispatchContext>) -> BoxFuture<'static, ActionResult> {
        (self.action)(ctx)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name())
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}
