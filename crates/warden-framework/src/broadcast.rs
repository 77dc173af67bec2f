//! Capability broadcast: fans a system event out to every module that
//! implements the matching capability.
//!
//! Hooks run one after another in registration order. A hook that fails or
//! panics is logged and skipped; the remaining modules still run.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use warden_core::{ChatId, UserId};

use crate::handler::Outcome;
use crate::module::{Capability, HookFuture, ModuleDescriptor, ModuleRegistry};

/// Per-module results of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Modules whose hook completed.
    pub succeeded: Vec<String>,
    /// Modules whose hook failed or panicked, with the reason.
    pub failed: Vec<(String, String)>,
}

impl BroadcastReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of hooks invoked.
    pub fn invoked(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Fans events out to module hooks.
#[derive(Debug, Clone)]
pub struct CapabilityBroadcast {
    registry: Arc<ModuleRegistry>,
}

impl CapabilityBroadcast {
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    /// Runs `call` for every module implementing `capability`.
    ///
    /// Returns the successful values keyed by module name, plus the report.
    async fn fan_out<T, F>(
        &self,
        capability: Capability,
        mut call: F,
    ) -> (Vec<(String, T)>, BroadcastReport)
    where
        F: FnMut(&ModuleDescriptor) -> Option<HookFuture<T>>,
    {
        let mut values = Vec::new();
        let mut report = BroadcastReport::default();

        for module in self.registry.all_with(capability) {
            let Some(fut) = call(module) else { continue };
            let name = module.name().to_string();

            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(value)) => {
                    report.succeeded.push(name.clone());
                    values.push((name, value));
                }
                Ok(Err(err)) => {
                    warn!(module = %name, %capability, error = %err, "Capability hook failed");
                    report.failed.push((name, err.to_string()));
                }
                Err(_) => {
                    warn!(module = %name, %capability, "Capability hook panicked");
                    report.failed.push((name, "panicked".to_string()));
                }
            }
        }

        (values, report)
    }

    /// Moves every module's state from `old` to `new`.
    ///
    /// Migration notices are terminal, so this always asks the walk to stop.
    pub async fn on_migration(&self, old: ChatId, new: ChatId) -> Outcome {
        info!(old_chat = %old, new_chat = %new, "Migrating chat");
        let (_, report) = self
            .fan_out(Capability::Migrate, |m| m.migrate_hook().map(|h| h(old, new)))
            .await;
        debug!(
            migrated = report.succeeded.len(),
            failed = report.failed.len(),
            "Chat migration finished"
        );
        Outcome::StopGroupWalk
    }

    /// Erases everything every module stores about `user`.
    pub async fn erase_user(&self, user: UserId) -> BroadcastReport {
        let (_, report) = self
            .fan_out(Capability::Gdpr, |m| m.gdpr_hook().map(|h| h(user)))
            .await;
        report
    }

    /// Collects `/info` sections for `user`, skipping modules with nothing to say.
    pub async fn user_info(&self, user: UserId) -> Vec<String> {
        let (values, _) = self
            .fan_out(Capability::UserInfo, |m| m.user_info_hook().map(|h| h(user)))
            .await;
        values
            .into_iter()
            .filter_map(|(_, text)| text.filter(|t| !t.trim().is_empty()))
            .collect()
    }

    /// Collects one `/stats` line per module.
    pub async fn stats(&self) -> Vec<String> {
        let (values, _) = self
            .fan_out(Capability::Stats, |m| m.stats_hook().map(|h| h()))
            .await;
        values.into_iter().map(|(_, line)| line).collect()
    }

    /// Renders every module's user settings as `(module, text)` pairs.
    pub async fn user_settings(&self, user: UserId) -> Vec<(String, String)> {
        let (values, _) = self
            .fan_out(Capability::UserSettings, |m| {
                m.user_settings_hook().map(|h| h(user))
            })
            .await;
        values
    }

    /// Builds a backup object with one section per exporting module, keyed
    /// by module key.
    pub async fn export_chat(&self, chat: ChatId) -> Map<String, Value> {
        let (values, _) = self
            .fan_out(Capability::DataExport, |m| m.export_hook().map(|h| h(chat)))
            .await;
        values
            .into_iter()
            .map(|(name, section)| (name.to_lowercase(), section))
            .collect()
    }

    /// Feeds each section of `backup` to the importing module with the same
    /// key. Sections with no matching module are ignored.
    pub async fn import_chat(&self, chat: ChatId, backup: &Map<String, Value>) -> BroadcastReport {
        let (_, report) = self
            .fan_out(Capability::DataImport, |m| {
                let section = backup.get(&m.key())?.clone();
                m.import_hook().map(|h| h(chat, section))
            })
            .await;
        report
    }
}
