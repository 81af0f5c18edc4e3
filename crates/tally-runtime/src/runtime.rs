//! Runtime orchestration.
//!
//! The runtime owns the single [`CountingStore`] for the process, wraps it
//! in a [`Router`], and runs every inbound event on its own task. Store
//! work runs on tokio's blocking pool since a matching message writes the
//! snapshot to disk.
//!
//! ```rust,ignore
//! use tally_runtime::TallyRuntime;
//!
//! let runtime = TallyRuntime::builder()
//!     .config_file("tally.toml")
//!     .data_file("/var/lib/tally/data.json")
//!     .build()?;
//!
//! runtime.run(events, platform).await?;
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::{Stream, StreamExt};
use tally_core::CountingStore;
use tally_framework::{InboundEvent, Platform, Router, deliver};
use tokio::signal;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, debug_span, error, info, warn};

use crate::config::{ConfigLoader, TallyConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// A stream of inbound events produced by a transport.
pub trait EventSource: Stream<Item = InboundEvent> + Send {}

impl<S> EventSource for S where S: Stream<Item = InboundEvent> + Send {}

/// Counters describing what a [`TallyRuntime::run`] call processed.
#[derive(Debug, Default)]
pub struct RuntimeStats {
    /// Message events received.
    pub messages: AtomicU64,
    /// Command events received.
    pub commands: AtomicU64,
}

impl RuntimeStats {
    fn record(&self, event: &InboundEvent) {
        let counter = match event {
            InboundEvent::Message(_) => &self.messages,
            InboundEvent::Command(_) => &self.commands,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Total events received.
    pub fn total(&self) -> u64 {
        self.messages.load(Ordering::Relaxed) + self.commands.load(Ordering::Relaxed)
    }
}

/// The Tally runtime: one store, one router, many concurrent handlers.
pub struct TallyRuntime {
    config: TallyConfig,
    router: Router,
    shutdown: CancellationToken,
    stats: RuntimeStats,
}

impl TallyRuntime {
    /// Creates a runtime from the configuration found in the current
    /// directory.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    /// Creates a runtime builder for custom configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from configuration.
    ///
    /// Initializes logging, then opens the counting store. A snapshot file
    /// that exists but cannot be loaded aborts startup.
    pub fn from_config(config: &TallyConfig) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        let store = CountingStore::open(&config.storage.data_file, &config.seed).map_err(|e| {
            error!(error = %e, "Refusing to start with unreadable counter state");
            e
        })?;

        if store.token().is_empty() {
            warn!("No platform token configured");
        }

        info!(
            data_file = %config.storage.data_file.display(),
            users = store.user_count(),
            triggers = store.trigger_words().count(),
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(Self::with_store(config.clone(), Arc::new(store)))
    }

    /// Creates a runtime around an existing store.
    pub fn with_store(config: TallyConfig, store: Arc<CountingStore>) -> Self {
        Self {
            config,
            router: Router::new(store),
            shutdown: CancellationToken::new(),
            stats: RuntimeStats::default(),
        }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &TallyConfig {
        &self.config
    }

    /// Returns the event router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Returns the shared counting store.
    pub fn store(&self) -> &Arc<CountingStore> {
        self.router.store()
    }

    /// Returns the platform authentication token from the persisted state.
    pub fn token(&self) -> &str {
        self.store().token()
    }

    /// Returns the snapshot location.
    pub fn data_file(&self) -> &Path {
        &self.config.storage.data_file
    }

    /// Returns event counters.
    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Returns a token that stops [`run`](Self::run) when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Handles one event on a new task and delivers the result.
    pub fn dispatch(&self, event: InboundEvent, platform: Arc<dyn Platform>) -> JoinHandle<()> {
        self.stats.record(&event);
        tokio::spawn(process(self.router.clone(), platform, event))
    }

    /// Pulls events from `source` until it ends, Ctrl+C / SIGTERM arrives,
    /// or the shutdown token is cancelled. Waits for in-flight handlers
    /// before returning.
    pub async fn run<S>(&self, source: S, platform: Arc<dyn Platform>) -> RuntimeResult<()>
    where
        S: EventSource,
    {
        let mut source = std::pin::pin!(source);
        let mut tasks = JoinSet::new();
        let signal = wait_for_signal();
        tokio::pin!(signal);

        info!("Tally runtime is now running. Press Ctrl+C to stop.");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                _ = &mut signal => break,
                next = source.next() => match next {
                    Some(event) => {
                        self.stats.record(&event);
                        tasks.spawn(process(self.router.clone(), Arc::clone(&platform), event));
                    }
                    None => {
                        info!("Event source closed");
                        break;
                    }
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    log_join(joined);
                }
            }
        }

        debug!(pending = tasks.len(), "Waiting for in-flight handlers");
        while let Some(joined) = tasks.join_next().await {
            log_join(joined);
        }

        info!(
            messages = self.stats.messages.load(Ordering::Relaxed),
            commands = self.stats.commands.load(Ordering::Relaxed),
            "Runtime stopped"
        );

        Ok(())
    }
}

/// Routes one event and delivers whatever the router produced.
async fn process(router: Router, platform: Arc<dyn Platform>, event: InboundEvent) {
    let span = debug_span!("dispatch", event_name = event.event_name());

    async move {
        let routed = {
            let event = event.clone();
            tokio::task::spawn_blocking(move || router.handle(&event)).await
        };

        match routed {
            Ok(outbound) => deliver(platform.as_ref(), &event, outbound).await,
            Err(e) => error!(error = %e, "Event handler panicked"),
        }
    }
    .instrument(span)
    .await
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Event task failed");
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c() => {}
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `TallyRuntime` with custom configuration.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder searching the current directory.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Overrides the snapshot location.
    pub fn data_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.set("storage.data_file", path.as_ref());
        self
    }

    /// Loads the configuration and opens the store.
    pub fn build(self) -> RuntimeResult<TallyRuntime> {
        let config = self.config_loader.load()?;
        TallyRuntime::from_config(&config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
