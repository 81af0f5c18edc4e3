//! Tally Framework - routes platform events to the counting store.
//!
//! This crate provides:
//! - Plain-data inbound and outbound event types (`event`)
//! - The closed set of supported commands (`Command`)
//! - The event router that turns events into store calls and replies (`Router`)
//! - The outbound delivery seam implemented by transports (`Platform`)
//!
//! # Flow
//!
//! ```text
//! InboundEvent::Message ──► Router::handle_message ──► store.record_if_triggered
//!                                  │
//!                                  └──► Outbound::React(ReactionRequest)
//!
//! InboundEvent::Command ──► Command::parse ──► Router::execute ──► query::*
//!                                  │
//!                                  └──► Outbound::Respond(Response)
//! ```
//!
//! The router never fails: every event yields a reply, a reaction, or
//! nothing. Persistence and delivery problems are logged.

pub mod command;
pub mod error;
pub mod event;
pub mod platform;
pub mod router;

pub use command::Command;
pub use error::{PlatformError, PlatformResult};
pub use event::{
    CommandInvocation, InboundEvent, MessageEvent, Outbound, ReactionRequest, Response,
};
pub use platform::{Platform, deliver};
pub use router::Router;
