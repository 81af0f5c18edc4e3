//! # Tally
//!
//! A chat companion that counts how often each user says the magic word.
//!
//! ## Overview
//!
//! Every message containing one of the configured trigger words bumps its
//! author's counter, gets a reaction, and is written through to a JSON
//! snapshot. Users ask for their own count, someone else's, or the
//! leaderboard through commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────┐     ┌───────────────┐
//! │  Transport  │────▶│ TallyRuntime │────▶│ Router │────▶│ CountingStore │──▶ data.json
//! │ (EventSource│     │ (task/event) │     └───┬────┘     └───────────────┘
//! │  + Platform)│◀────│   deliver    │◀────────┘ Outbound
//! └─────────────┘     └──────────────┘
//! ```
//!
//! - **tally-core**: store, snapshot codec, leaderboard formatting
//! - **tally-framework**: event types, commands, router, `Platform` trait
//! - **tally-runtime**: configuration, logging, concurrent dispatch
//! - **console**: a JSON-lines transport over stdin/stdout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tally::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = TallyRuntime::builder().config_file("tally.toml").build()?;
//!     runtime
//!         .run(console::stdin_events(), Arc::new(ConsolePlatform::stdout()))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub mod console;

pub use tally_core as core;
pub use tally_framework as framework;
pub use tally_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::console::{self, ConsolePlatform};
    pub use tally_core::{CountingStore, Seed, Snapshot, UserRecord};
    pub use tally_framework::{
        Command, CommandInvocation, InboundEvent, MessageEvent, Outbound, Platform,
        PlatformError, PlatformResult, ReactionRequest, Response, Router,
    };
    pub use tally_runtime::{RuntimeError, TallyConfig, TallyRuntime};
}
