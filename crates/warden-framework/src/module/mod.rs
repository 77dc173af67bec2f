//! Feature modules and the registry of their capabilities.
//!
//! A feature module reaches the core through exactly two entry points,
//! both called once at load time:
//!
//! - [`Module::descriptor`] declares the module's name, help and the
//!   capability hooks it implements;
//! - [`Module::register_handlers`] adds its handlers to the handler table.
//!
//! The core never calls into a module except through these.

pub mod descriptor;
pub mod registry;

pub use descriptor::{
    Capability, ChatSettingsHook, ExportHook, GdprHook, HookFuture, ImportHook, MigrateHook,
    ModuleDescriptor, StatsHook, UserInfoHook, UserSettingsHook,
};
pub use registry::ModuleRegistry;

use crate::table::HandlerTable;

/// A loadable feature module.
pub trait Module: Send + Sync {
    /// Describes the module and the capabilities it implements.
    fn descriptor(&self) -> ModuleDescriptor;

    /// Adds the module's handlers to `table`.
    fn register_handlers(&self, table: &mut HandlerTable);
}

/// Shared, type-erased module.
pub type BoxedModule = Box<dyn Module>;
