//! Update dispatcher.
//!
//! For every inbound update the [`Dispatcher`]:
//!
//! 1. routes transport errors straight to the [`ErrorHandler`] and stops;
//! 2. drops updates without a chat, and updates the [`FloodGate`] rejects;
//!    this admission step is synchronous, see [`Dispatcher::admit`];
//! 3. walks the handler groups in ascending order, running the first
//!    matching handler of each group;
//! 4. stops the walk when an action (or the error handler) returns
//!    [`Outcome::StopGroupWalk`].
//!
//! Backend errors, module faults and panics raised by an action are
//! contained at the group boundary: they are logged (backend errors also go
//! to the error handler) and the walk continues with the next group.
//!
//! ```rust,ignore
//! let dispatcher = Dispatcher::builder(bot)
//!     .registry(registry)
//!     .table(table)
//!     .flood(FloodGate::new(FloodConfig::default()))
//!     .build();
//!
//! dispatcher.dispatch(update).await;
//! ```

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{Instrument, Span, debug, debug_span, error, trace, warn};

use warden_core::{ApiError, BoxedBot, Update, UpdateKind};

use crate::command::DEFAULT_PREFIXES;
use crate::context::DispatchContext;
use crate::error::ActionError;
use crate::error_handler::{ErrorHandler, LoggingErrorHandler};
use crate::flood::FloodGate;
use crate::handler::{ActionResult, Handler, Outcome};
use crate::module::ModuleRegistry;
use crate::table::HandlerTable;

/// Why an update produced no handler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnhandledReason {
    /// Rejected by the flood gate.
    Throttled,
    /// The update carried no chat.
    NoChat,
    /// No handler in any group matched.
    NoMatch,
}

/// Terminal state of one dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Unhandled(UnhandledReason),
    /// At least one handler ran and the walk reached the last group.
    Completed,
    /// A handler or the error handler stopped the walk.
    StoppedEarly,
    /// The update was a transport error and went to the error handler.
    TransportError,
}

/// An update that passed [`Dispatcher::admit`].
#[derive(Debug)]
pub struct Admitted(Pending);

#[derive(Debug)]
enum Pending {
    TransportError(ApiError),
    Walk { ctx: Arc<DispatchContext>, span: Span },
}

/// The central update dispatcher.
///
/// All state is behind `Arc`s, so clones are cheap and share the same
/// flood gate and handler table.
#[derive(Clone)]
pub struct Dispatcher {
    bot: BoxedBot,
    registry: Arc<ModuleRegistry>,
    table: Arc<HandlerTable>,
    flood: Arc<FloodGate>,
    error_handler: Arc<dyn ErrorHandler>,
    prefixes: Arc<[char]>,
}

impl Dispatcher {
    /// Starts building a dispatcher for `bot`.
    pub fn builder(bot: BoxedBot) -> DispatcherBuilder {
        DispatcherBuilder::new(bot)
    }

    pub fn bot(&self) -> &BoxedBot {
        &self.bot
    }

    pub fn registry(&self) -> &Arc<ModuleRegistry> {
        &self.registry
    }

    pub fn table(&self) -> &HandlerTable {
        &self.table
    }

    pub fn flood(&self) -> &Arc<FloodGate> {
        &self.flood
    }

    /// Processes one update to completion of its inline actions.
    ///
    /// Same as [`admit`](Self::admit) followed by [`process`](Self::process).
    /// Detached actions may still be running when this returns.
    pub async fn dispatch(&self, update: Update) -> DispatchState {
        match self.admit(update) {
            Ok(admitted) => self.process(admitted).await,
            Err(reason) => DispatchState::Unhandled(reason),
        }
    }

    /// Runs the checks that must happen in arrival order: the chat check and
    /// the flood gate. Transport errors are always admitted.
    ///
    /// Never awaits, so a run loop can call it for every update and hand the
    /// result to [`process`](Self::process) on a task of its own.
    pub fn admit(&self, update: Update) -> Result<Admitted, UnhandledReason> {
        if let UpdateKind::Error(err) = &update.kind {
            warn!(kind = err.kind(), error = %err, "Transport error while polling");
            return Ok(Admitted(Pending::TransportError(err.clone())));
        }

        let Some(chat_id) = update.chat_id() else {
            trace!(update_id = update.update_id, "Dropping update without a chat");
            return Err(UnhandledReason::NoChat);
        };

        if !self.flood.admit(chat_id, update.received_at) {
            return Err(UnhandledReason::Throttled);
        }

        let span = debug_span!(
            "dispatch",
            update_id = update.update_id,
            chat_id = chat_id.0,
            kind = update.kind_name()
        );
        let ctx = Arc::new(DispatchContext::new(
            Arc::new(update),
            Arc::clone(&self.bot),
            Arc::clone(&self.registry),
            Arc::clone(&self.prefixes),
        ));
        Ok(Admitted(Pending::Walk { ctx, span }))
    }

    /// Finishes an admitted update: routes a transport error to the error
    /// handler, or walks the handler groups.
    pub async fn process(&self, admitted: Admitted) -> DispatchState {
        match admitted.0 {
            Pending::TransportError(err) => {
                // The walk is not running, so a stop request has nothing to stop.
                let _ = self.route_error(None, &err).await;
                DispatchState::TransportError
            }
            Pending::Walk { ctx, span } => self.walk(ctx).instrument(span).await,
        }
    }

    async fn walk(&self, ctx: Arc<DispatchContext>) -> DispatchState {
        let mut handled = false;

        for (group, handlers) in self.table.groups() {
            let Some(handler) = Self::first_match(group, handlers, &ctx) else {
                continue;
            };
            handled = true;
            trace!(group, handler = handler.name(), "Handler matched");

            if handler.is_detached() {
                self.spawn_detached(group, handler.clone(), Arc::clone(&ctx));
                continue;
            }

            let result = AssertUnwindSafe(handler.invoke(Arc::clone(&ctx)))
                .catch_unwind()
                .await;
            let outcome = self.settle(group, handler.name(), result, ctx.update()).await;

            if outcome == Outcome::StopGroupWalk {
                debug!(group, handler = handler.name(), "Stopping further handlers");
                return DispatchState::StoppedEarly;
            }
        }

        if handled {
            DispatchState::Completed
        } else {
            DispatchState::Unhandled(UnhandledReason::NoMatch)
        }
    }

    /// First handler in `handlers` whose predicate matches.
    ///
    /// A panicking predicate forfeits the rest of its group.
    fn first_match<'a>(
        group: i32,
        handlers: &'a [Handler],
        ctx: &DispatchContext,
    ) -> Option<&'a Handler> {
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.matches(ctx))) {
                Ok(true) => return Some(handler),
                Ok(false) => {}
                Err(payload) => {
                    error!(
                        group,
                        handler = handler.name(),
                        panic = panic_message(payload.as_ref()),
                        "Predicate panicked"
                    );
                    return None;
                }
            }
        }
        None
    }

    fn spawn_detached(&self, group: i32, handler: Handler, ctx: Arc<DispatchContext>) {
        let this = self.clone();
        let span = tracing::Span::current();
        tokio::spawn(
            async move {
                let result = AssertUnwindSafe(handler.invoke(Arc::clone(&ctx)))
                    .catch_unwind()
                    .await;
                if this.settle(group, handler.name(), result, ctx.update()).await
                    == Outcome::StopGroupWalk
                {
                    debug!(group, handler = handler.name(), "Detached action cannot stop the walk");
                }
            }
            .instrument(span),
        );
    }

    /// Turns an action's result into an outcome, routing failures.
    async fn settle(
        &self,
        group: i32,
        handler: &str,
        result: Result<ActionResult, Box<dyn Any + Send>>,
        update: &Update,
    ) -> Outcome {
        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(ActionError::Backend(err))) => {
                warn!(group, handler, kind = err.kind(), error = %err, "Backend error while processing the update");
                self.route_error(Some(update), &err).await
            }
            Ok(Err(ActionError::Fault(err))) => {
                error!(group, handler, error = %err, "Module fault while processing the update");
                Outcome::Continue
            }
            Err(payload) => {
                error!(
                    group,
                    handler,
                    panic = panic_message(payload.as_ref()),
                    "Handler panicked while processing the update"
                );
                Outcome::Continue
            }
        }
    }

    /// Hands `err` to the error handler. Failures there are logged only.
    async fn route_error(&self, update: Option<&Update>, err: &ApiError) -> Outcome {
        let handled = AssertUnwindSafe(self.error_handler.handle(update, err, &self.bot))
            .catch_unwind()
            .await;
        match handled {
            Ok(Ok(outcome)) => {
                if outcome == Outcome::StopGroupWalk {
                    debug!("Error handler stopped further handlers");
                }
                outcome
            }
            Ok(Err(e)) => {
                error!(error = %e, "An uncaught error was raised while handling the error");
                Outcome::Continue
            }
            Err(payload) => {
                error!(
                    panic = panic_message(payload.as_ref()),
                    "Error handler panicked"
                );
                Outcome::Continue
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("modules", &self.registry.len())
            .field("groups", &self.table.group_count())
            .field("handlers", &self.table.handler_count())
            .field("flood", &self.flood)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Dispatcher`].
pub struct DispatcherBuilder {
    bot: BoxedBot,
    registry: Arc<ModuleRegistry>,
    table: HandlerTable,
    flood: Arc<FloodGate>,
    error_handler: Arc<dyn ErrorHandler>,
    prefixes: Vec<char>,
}

impl DispatcherBuilder {
    fn new(bot: BoxedBot) -> Self {
        Self {
            bot,
            registry: Arc::default(),
            table: HandlerTable::new(),
            flood: Arc::default(),
            error_handler: Arc::new(LoggingErrorHandler),
            prefixes: DEFAULT_PREFIXES.to_vec(),
        }
    }

    pub fn registry(mut self, registry: impl Into<Arc<ModuleRegistry>>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn table(mut self, table: HandlerTable) -> Self {
        self.table = table;
        self
    }

    pub fn flood(mut self, flood: impl Into<Arc<FloodGate>>) -> Self {
        self.flood = flood.into();
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Like [`error_handler`](Self::error_handler) for an already shared handler.
    pub fn shared_error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    /// Characters accepted in front of command names. Defaults to `/`.
    pub fn command_prefixes(mut self, prefixes: &[char]) -> Self {
        self.prefixes = prefixes.to_vec();
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            bot: self.bot,
            registry: self.registry,
            table: Arc::new(self.table),
            flood: self.flood,
            error_handler: self.error_handler,
            prefixes: self.prefixes.into(),
        }
    }
}
