//! The module registry.
//!
//! Built once at startup from the loaded modules' descriptors, then shared
//! read-only behind an `Arc`. Lookups are by lowercased name; broadcasts and
//! menus iterate in registration order.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{RegistryError, RegistryResult};
use crate::module::descriptor::{Capability, ModuleDescriptor};

/// Characters reserved by the callback-data encoding.
const RESERVED_NAME_CHARS: &[char] = &['(', ')', ','];

/// Registered module descriptors.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: Vec<ModuleDescriptor>,
    by_key: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from descriptors in load order.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ModuleDescriptor>,
    ) -> RegistryResult<Self> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        info!(modules = registry.len(), "Module registry built");
        Ok(registry)
    }

    /// Registers a descriptor.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, a name containing `(`, `)` or `,`, or a name
    /// already taken by another module (compared case-insensitively).
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> RegistryResult<()> {
        let name = descriptor.name();
        if name.trim().is_empty() {
            return Err(RegistryError::MissingField("name"));
        }
        if name.contains(RESERVED_NAME_CHARS) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }

        let key = descriptor.key();
        if self.by_key.contains_key(&key) {
            return Err(RegistryError::DuplicateModuleName(name.to_string()));
        }

        debug!(
            module = name,
            capabilities = ?descriptor.capabilities(),
            "Registered module"
        );
        self.by_key.insert(key, self.modules.len());
        self.modules.push(descriptor);
        Ok(())
    }

    /// Returns the module named `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.by_key
            .get(&name.to_lowercase())
            .map(|idx| &self.modules[*idx])
    }

    /// Returns the module named `name` if it implements `capability`.
    pub fn lookup(&self, capability: Capability, name: &str) -> Option<&ModuleDescriptor> {
        self.get(name).filter(|d| d.has(capability))
    }

    /// All modules implementing `capability`, in registration order.
    pub fn all_with(&self, capability: Capability) -> Vec<&ModuleDescriptor> {
        self.modules.iter().filter(|d| d.has(capability)).collect()
    }

    /// All modules, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
