//! Tally Runtime - process-level orchestration for the Tally bot.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `TallyConfig`)
//! - Logging setup from configuration
//! - Startup: opening the counting store from its snapshot
//! - Concurrent event dispatch (`TallyRuntime`)
//!
//! ```ignore
//! use tally_runtime::TallyRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TallyRuntime::builder().config_file("tally.toml").build()?;
//!
//!     // Any stream of InboundEvent plus any Platform implementation.
//!     runtime.run(events, platform).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, StorageConfig, TallyConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use runtime::{EventSource, RuntimeBuilder, RuntimeStats, TallyRuntime};
