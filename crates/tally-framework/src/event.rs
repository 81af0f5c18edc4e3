//! Plain-data events exchanged with a transport.
//!
//! Transports convert their platform objects into these types before handing
//! them to the router, and deliver the [`Outbound`] values it returns.
//! All types serialize with serde so line-oriented transports can use them
//! directly:
//!
//! ```json
//! {"type": "message", "channel_id": "c", "message_id": "m", "author_id": "1",
//!  "author_name": "alice", "content": "banana"}
//! {"type": "command", "name": "count", "invoker_id": "1", "target": "2"}
//! ```

use serde::{Deserialize, Serialize};
use tally_core::UserId;

/// A message posted in a channel the bot can see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Channel the message was posted in.
    pub channel_id: String,
    /// Platform id of the message.
    pub message_id: String,
    /// Stable id of the author.
    pub author_id: UserId,
    /// Author's current display name.
    pub author_name: String,
    /// Whether the author is a bot account.
    #[serde(default)]
    pub is_bot: bool,
    /// Whether the author is the platform itself.
    #[serde(default)]
    pub is_system: bool,
    /// Raw message text.
    pub content: String,
}

impl MessageEvent {
    /// Returns `true` if the author is a human user.
    pub fn from_human(&self) -> bool {
        !self.is_bot && !self.is_system
    }
}

/// A command invoked by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Command name as registered with the platform.
    pub name: String,
    /// Id of the user who invoked the command.
    pub invoker_id: UserId,
    /// Optional user argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<UserId>,
}

impl CommandInvocation {
    /// Creates an invocation without a target.
    pub fn new(name: impl Into<String>, invoker_id: impl Into<UserId>) -> Self {
        Self {
            name: name.into(),
            invoker_id: invoker_id.into(),
            target: None,
        }
    }

    /// Sets the target user (builder pattern).
    pub fn with_target(mut self, target: impl Into<UserId>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Any event the router accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A channel message.
    Message(MessageEvent),
    /// A command invocation.
    Command(CommandInvocation),
}

impl InboundEvent {
    /// Returns a short name for logging.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Command(_) => "command",
        }
    }
}

/// Reply to a command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Reply text.
    pub text: String,
}

impl Response {
    /// Creates a response.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Request to attach a reaction to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionRequest {
    /// Channel holding the message.
    pub channel_id: String,
    /// Message to react to.
    pub message_id: String,
    /// Reaction symbol.
    pub symbol: String,
}

/// What the transport should do after the router handled an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Reply to the invoking command.
    Respond(Response),
    /// React to the triggering message.
    React(ReactionRequest),
    /// Nothing to deliver.
    Nothing,
}
