//! Dispatch core for the Warden bot framework.
//!
//! This crate turns a stream of [`Update`](warden_core::Update)s into handler
//! runs. It owns everything between the transport and the feature modules:
//!
//! - **Module registry** ([`module`]): descriptors declaring which capability
//!   hooks each feature module implements, built once at startup.
//! - **Flood gate** ([`flood`]): per-chat windowed admission control.
//! - **Handler table** ([`table`], [`handler`], [`filters`]): numbered groups
//!   of predicate/action pairs.
//! - **Dispatcher** ([`dispatcher`]): the group walk with stop and
//!   error-isolation semantics.
//! - **Capability broadcast** ([`broadcast`]): fan-out of system events to
//!   module hooks.
//! - **Menus** ([`pagination`], [`callback`]): paginated module menus and
//!   the callback-data encoding their buttons use.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_framework::prelude::*;
//!
//! let table = HandlerTable::new().with(
//!     0,
//!     Handler::new(command(&["ping"]), |ctx| async move {
//!         ctx.reply_text("pong").await?;
//!         Ok(Outcome::Continue)
//!     }),
//! );
//!
//! let dispatcher = Dispatcher::builder(bot).table(table).build();
//! dispatcher.dispatch(update).await;
//! ```

pub mod broadcast;
pub mod callback;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod error_handler;
pub mod filters;
pub mod flood;
pub mod handler;
pub mod module;
pub mod pagination;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use broadcast::{BroadcastReport, CapabilityBroadcast};
pub use callback::{CallbackData, CallbackParseError, HELP_PREFIX, SETTINGS_PREFIX};
pub use command::{CommandInvocation, DEFAULT_PREFIXES};
pub use context::DispatchContext;
pub use dispatcher::{Admitted, DispatchState, Dispatcher, DispatcherBuilder, UnhandledReason};
pub use error::{ActionError, BoxError, RegistryError, RegistryResult};
pub use error_handler::{ErrorHandler, LoggingErrorHandler};
pub use filters::Predicate;
pub use flood::{FloodConfig, FloodGate, FloodState};
pub use handler::{ActionResult, Handler, Outcome};
pub use module::{BoxedModule, Capability, HookFuture, Module, ModuleDescriptor, ModuleRegistry};
pub use pagination::{MenuKind, MenuLayout, Page, module_menu, page, page_count, registry_menu};
pub use table::{DEFAULT_GROUP, HandlerTable};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::broadcast::CapabilityBroadcast;
    pub use crate::callback::CallbackData;
    pub use crate::context::DispatchContext;
    pub use crate::dispatcher::{DispatchState, Dispatcher};
    pub use crate::error::{ActionError, BoxError};
    pub use crate::filters::{
        Predicate, callback_prefix, command, from_users, group_chat, in_chats, migration,
        private_chat,
    };
    pub use crate::flood::{FloodConfig, FloodGate};
    pub use crate::handler::{ActionResult, Handler, Outcome};
    pub use crate::module::{Capability, Module, ModuleDescriptor, ModuleRegistry};
    pub use crate::pagination::{MenuKind, MenuLayout};
    pub use crate::table::HandlerTable;
}
