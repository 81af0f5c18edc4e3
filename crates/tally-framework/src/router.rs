//! Event router.
//!
//! The [`Router`] is the only place that knows how an inbound event maps to
//! store operations. It is cheap to clone and shares one
//! [`CountingStore`] between all clones, so a transport can hand a clone to
//! every concurrently running handler.
//!
//! Store calls may block on disk I/O; async callers should run
//! [`Router::handle`] on a blocking-capable thread.

use std::sync::Arc;

use tally_core::{CountingStore, Subject, fold_case, format_leaderboard, format_single_user};
use tracing::{debug, warn};

use crate::command::Command;
use crate::event::{
    CommandInvocation, InboundEvent, MessageEvent, Outbound, ReactionRequest, Response,
};

/// Dispatches inbound events to the counting store.
#[derive(Debug, Clone)]
pub struct Router {
    store: Arc<CountingStore>,
}

impl Router {
    /// Creates a router over the given store.
    pub fn new(store: Arc<CountingStore>) -> Self {
        Self { store }
    }

    /// Returns the shared store.
    pub fn store(&self) -> &Arc<CountingStore> {
        &self.store
    }

    /// Handles any inbound event.
    pub fn handle(&self, event: &InboundEvent) -> Outbound {
        match event {
            InboundEvent::Message(msg) => self
                .handle_message(msg)
                .map_or(Outbound::Nothing, Outbound::React),
            InboundEvent::Command(invocation) => self
                .handle_command(invocation)
                .map_or(Outbound::Nothing, Outbound::Respond),
        }
    }

    /// Answers a command invocation.
    ///
    /// Returns `None` only for unknown command names; every known command
    /// produces exactly one response.
    pub fn handle_command(&self, invocation: &CommandInvocation) -> Option<Response> {
        let Some(command) = Command::parse(invocation) else {
            debug!(name = %invocation.name, "Ignoring unknown command");
            return None;
        };

        Some(self.execute(&command, &invocation.invoker_id))
    }

    /// Runs a parsed command on behalf of `invoker_id`.
    pub fn execute(&self, command: &Command, invoker_id: &str) -> Response {
        let text = match command {
            Command::Count { target: Some(target) } => {
                format_single_user(self.store.lookup(target).as_ref(), Subject::Other)
            }
            Command::Count { target: None } => {
                format_single_user(self.store.lookup(invoker_id).as_ref(), Subject::Invoker)
            }
            Command::Leaderboard => format_leaderboard(self.store.snapshot_all()),
        };

        debug!(command = command.name(), invoker_id, "Command answered");
        Response::new(text)
    }

    /// Counts a message and returns the reaction to send, if it matched.
    ///
    /// Messages from bots and system accounts are ignored. A failed snapshot
    /// write is logged; the count and the reaction are unaffected by it.
    pub fn handle_message(&self, msg: &MessageEvent) -> Option<ReactionRequest> {
        if !msg.from_human() {
            return None;
        }

        let content = fold_case(&msg.content);
        let recorded = self
            .store
            .record_if_triggered(&msg.author_id, &msg.author_name, &content)?;

        if let Err(e) = &recorded.persisted {
            warn!(
                user_id = %msg.author_id,
                count = recorded.count,
                error = %e,
                "Failed to persist snapshot, keeping count in memory"
            );
        }

        Some(ReactionRequest {
            channel_id: msg.channel_id.clone(),
            message_id: msg.message_id.clone(),
            symbol: self.store.reaction().to_string(),
        })
    }
}
