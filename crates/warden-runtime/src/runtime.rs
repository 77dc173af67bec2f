//! Runtime orchestration.
//!
//! [`WardenRuntime`] owns the configuration and the feature modules. It
//! assembles the module registry, the handler table (core handlers first)
//! and the flood gate into a [`Dispatcher`], then feeds it the updates the
//! transport pushes into a channel.
//!
//! The loop admits updates one at a time, in arrival order, and walks each
//! admitted update on its own task. A slow action in one chat does not hold
//! up the next update. Shutdown stops admission and waits for the walks
//! already started.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use warden_runtime::WardenRuntime;
//!
//! let runtime = WardenRuntime::builder()
//!     .config_file("config/warden.toml")
//!     .build()?
//!     .with_module(Bios::in_memory());
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(256);
//! // hand `tx` to the transport ...
//! runtime.run(bot, rx).await?;
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use warden_core::{BoxedBot, Update};
use warden_framework::{
    BoxedModule, DispatchState, Dispatcher, ErrorHandler, FloodGate, HandlerTable, Module,
    ModuleRegistry, UnhandledReason,
};

use crate::builtins::{CoreSettings, register_builtins};
use crate::config::{ConfigLoader, ConfigResult, WardenConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// Counters for one run of the update loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Updates taken off the channel.
    pub received: usize,
    /// Updates for which at least one handler ran.
    pub handled: usize,
    /// Updates rejected by the flood gate.
    pub throttled: usize,
    /// Updates nothing matched, or that carried no chat.
    pub unmatched: usize,
    /// Transport errors routed to the error handler.
    pub transport_errors: usize,
}

impl RunStats {
    fn record(&mut self, state: DispatchState) {
        self.received += 1;
        match state {
            DispatchState::Completed | DispatchState::StoppedEarly => self.handled += 1,
            DispatchState::Unhandled(UnhandledReason::Throttled) => self.throttled += 1,
            DispatchState::Unhandled(_) => self.unmatched += 1,
            DispatchState::TransportError => self.transport_errors += 1,
        }
    }

    fn settle(&mut self, done: Result<DispatchState, JoinError>) {
        match done {
            Ok(state) => self.record(state),
            Err(e) => {
                self.received += 1;
                error!(error = %e, "Update task ended abnormally");
            }
        }
    }
}

/// The Warden runtime.
pub struct WardenRuntime {
    config: WardenConfig,
    modules: Vec<BoxedModule>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl WardenRuntime {
    /// Creates a runtime builder that loads configuration from files and
    /// the environment.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration and
    /// initializes logging from its `[logging]` section.
    pub fn from_config(config: WardenConfig) -> Self {
        logging::init_from_config(&config.logging);

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            flood_threshold = config.flood.threshold,
            "Runtime initialized from configuration"
        );

        Self {
            config,
            modules: Vec::new(),
            error_handler: None,
        }
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    /// Adds a feature module. Modules load in the order they are added.
    pub fn register_module(&mut self, module: impl Module + 'static) {
        self.modules.push(Box::new(module));
    }

    /// Adds a feature module (builder pattern).
    pub fn with_module(mut self, module: impl Module + 'static) -> Self {
        self.register_module(module);
        self
    }

    /// Replaces the default logging error handler.
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Assembles the dispatcher for `bot`.
    ///
    /// # Errors
    ///
    /// Fails when two modules share a name or a descriptor is incomplete;
    /// no update may be served in that case.
    pub fn dispatcher(&self, bot: BoxedBot) -> RuntimeResult<Dispatcher> {
        let registry =
            ModuleRegistry::from_descriptors(self.modules.iter().map(|m| m.descriptor()))?;

        let mut table = HandlerTable::new();
        let core = CoreSettings {
            bot: self.config.bot.clone(),
            layout: self.config.menu.layout(),
        };
        register_builtins(&mut table, Arc::new(core));
        for module in &self.modules {
            module.register_handlers(&mut table);
        }
        debug!(
            groups = table.group_count(),
            handlers = table.handler_count(),
            "Handler table assembled"
        );

        let mut builder = Dispatcher::builder(bot)
            .registry(registry)
            .table(table)
            .flood(FloodGate::new(self.config.flood.to_flood_config()))
            .command_prefixes(&self.config.bot.command_prefixes());
        if let Some(handler) = &self.error_handler {
            builder = builder.shared_error_handler(Arc::clone(handler));
        }
        Ok(builder.build())
    }

    /// Serves `updates` until the channel closes or Ctrl+C / SIGTERM arrives.
    pub async fn run(
        &self,
        bot: BoxedBot,
        updates: mpsc::Receiver<Update>,
    ) -> RuntimeResult<RunStats> {
        info!("Warden runtime is now running. Press Ctrl+C to stop.");
        self.serve(bot, updates, wait_for_shutdown()).await
    }

    /// Serves `updates` until the channel closes or `shutdown` is cancelled.
    pub async fn run_until(
        &self,
        bot: BoxedBot,
        updates: mpsc::Receiver<Update>,
        shutdown: CancellationToken,
    ) -> RuntimeResult<RunStats> {
        self.serve(bot, updates, shutdown.cancelled_owned()).await
    }

    async fn serve<F>(
        &self,
        bot: BoxedBot,
        mut updates: mpsc::Receiver<Update>,
        shutdown: F,
    ) -> RuntimeResult<RunStats>
    where
        F: Future<Output = ()>,
    {
        let dispatcher = self.dispatcher(bot)?;
        let sweep_stop = CancellationToken::new();
        let sweeper = spawn_sweeper(
            Arc::clone(dispatcher.flood()),
            self.config.flood.sweep_interval(),
            sweep_stop.clone(),
        );

        info!(
            modules = dispatcher.registry().len(),
            handlers = dispatcher.table().handler_count(),
            "Dispatching updates"
        );

        let mut stats = RunStats::default();
        let mut in_flight: JoinSet<DispatchState> = JoinSet::new();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    stats.settle(done);
                }
                update = updates.recv() => match update {
                    // Admitted in arrival order; each walk gets its own task.
                    Some(update) => match dispatcher.admit(update) {
                        Ok(admitted) => {
                            let dispatcher = dispatcher.clone();
                            in_flight.spawn(async move { dispatcher.process(admitted).await });
                        }
                        Err(reason) => stats.record(DispatchState::Unhandled(reason)),
                    },
                    None => {
                        info!("Update channel closed");
                        break;
                    }
                },
            }
        }

        if !in_flight.is_empty() {
            info!(pending = in_flight.len(), "Waiting for in-flight updates");
        }
        while let Some(done) = in_flight.join_next().await {
            stats.settle(done);
        }

        sweep_stop.cancel();
        if let Err(e) = sweeper.await {
            warn!(error = %e, "Flood sweeper ended abnormally");
        }

        info!(
            received = stats.received,
            handled = stats.handled,
            throttled = stats.throttled,
            "Runtime stopped"
        );
        Ok(stats)
    }
}

/// Periodically drops expired flood entries until `stop` is cancelled.
fn spawn_sweeper(
    flood: Arc<FloodGate>,
    every: Duration,
    stop: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = ticker.tick() => {
                    flood.sweep(Instant::now());
                }
            }
        }
    })
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// If no signal can be listened for, never resolves; the loop then ends
/// only when the update channel closes.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`WardenRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = WardenRuntime::builder()
///     .config_file("config/production.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile, e.g. `production`.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges a full configuration over every other source.
    pub fn merge(mut self, config: WardenConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates the configuration, then builds the runtime.
    pub fn build(self) -> ConfigResult<WardenRuntime> {
        let config = self.config_loader.load()?;
        Ok(WardenRuntime::from_config(config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_stats_record() {
        let mut stats = RunStats::default();
        stats.record(DispatchState::Completed);
        stats.record(DispatchState::StoppedEarly);
        stats.record(DispatchState::Unhandled(UnhandledReason::Throttled));
        stats.record(DispatchState::Unhandled(UnhandledReason::NoMatch));
        stats.record(DispatchState::Unhandled(UnhandledReason::NoChat));
        stats.record(DispatchState::TransportError);

        assert_eq!(
            stats,
            RunStats {
                received: 6,
                handled: 2,
                throttled: 1,
                unmatched: 2,
                transport_errors: 1,
            }
        );
    }

    #[test]
    fn test_with_module() {
        struct Nothing;
        impl Module for Nothing {
            fn descriptor(&self) -> warden_framework::ModuleDescriptor {
                warden_framework::ModuleDescriptor::new("Nothing")
            }
            fn register_handlers(&self, _table: &mut HandlerTable) {}
        }

        let runtime = WardenRuntime::from_config(WardenConfig::default()).with_module(Nothing);
        assert_eq!(runtime.module_count(), 1);
    }
}
