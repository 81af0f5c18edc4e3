//! Outbound delivery seam.
//!
//! A transport implements [`Platform`] to deliver what the router produces.
//! Delivery is best effort: [`deliver`] logs failures and never retries.

use async_trait::async_trait;
use tracing::{error, trace, warn};

use crate::error::PlatformResult;
use crate::event::{CommandInvocation, InboundEvent, Outbound, ReactionRequest, Response};

/// Delivers responses and reactions to the chat platform.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Replies to a command invocation.
    async fn respond(
        &self,
        invocation: &CommandInvocation,
        response: Response,
    ) -> PlatformResult<()>;

    /// Attaches a reaction to a message.
    async fn react(&self, reaction: ReactionRequest) -> PlatformResult<()>;
}

/// Delivers the router's output for `event` through `platform`.
///
/// Failures are logged and swallowed; they never affect the counters.
pub async fn deliver(platform: &dyn Platform, event: &InboundEvent, outbound: Outbound) {
    match (outbound, event) {
        (Outbound::Respond(response), InboundEvent::Command(invocation)) => {
            if let Err(e) = platform.respond(invocation, response).await {
                error!(command = %invocation.name, error = %e, "Failed to send command response");
            }
        }
        (Outbound::React(reaction), _) => {
            let message_id = reaction.message_id.clone();
            if let Err(e) = platform.react(reaction).await {
                warn!(message_id = %message_id, error = %e, "Failed to add reaction");
            }
        }
        (Outbound::Respond(_), other) => {
            warn!(
                event = other.event_name(),
                "Dropping response for an event that is not a command"
            );
        }
        (Outbound::Nothing, _) => trace!(event = event.event_name(), "Nothing to deliver"),
    }
}
