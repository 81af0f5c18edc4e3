//! A JSON-lines transport over stdin and stdout.
//!
//! Each input line is one [`InboundEvent`] in its tagged JSON form:
//!
//! ```text
//! {"type":"message","channel_id":"c","message_id":"m1","author_id":"u1","author_name":"Ann","is_bot":false,"is_system":false,"content":"banana!"}
//! {"type":"command","name":"leaderboard","invoker_id":"u1"}
//! ```
//!
//! Responses and reactions are written back as one JSON object per line.
//! Lines that fail to parse are logged and skipped.

use async_trait::async_trait;
use futures::{Stream, stream};
use serde_json::json;
use tally_framework::{
    CommandInvocation, InboundEvent, Platform, PlatformError, PlatformResult, ReactionRequest,
    Response,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Parses one input line. Blank and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Skipping malformed console event");
            None
        }
    }
}

/// Reads events from `reader` until end of input or a read error.
pub fn events_from_reader<R>(reader: R) -> impl Stream<Item = InboundEvent> + Send
where
    R: AsyncRead + Unpin + Send,
{
    let lines = BufReader::new(reader).lines();

    stream::unfold(lines, |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = parse_line(&line) {
                        return Some((event, lines));
                    }
                }
                Ok(None) => {
                    debug!("Console input closed");
                    return None;
                }
                Err(e) => {
                    warn!(error = %e, "Stopped reading console input");
                    return None;
                }
            }
        }
    })
}

/// Reads events from the process's stdin.
pub fn stdin_events() -> impl Stream<Item = InboundEvent> + Send {
    events_from_reader(tokio::io::stdin())
}

/// Writes responses and reactions as JSON lines.
pub struct ConsolePlatform<W> {
    out: Mutex<W>,
}

impl ConsolePlatform<Stdout> {
    /// A platform writing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsolePlatform<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consumes the platform, returning the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    async fn write_line(&self, value: serde_json::Value) -> PlatformResult<()> {
        let mut line =
            serde_json::to_vec(&value).map_err(|e| PlatformError::delivery(e.to_string()))?;
        line.push(b'\n');

        let mut out = self.out.lock().await;
        out.write_all(&line).await?;
        out.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> Platform for ConsolePlatform<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn respond(
        &self,
        invocation: &CommandInvocation,
        response: Response,
    ) -> PlatformResult<()> {
        self.write_line(json!({
            "type": "response",
            "command": invocation.name,
            "invoker_id": invocation.invoker_id,
            "text": response.text,
        }))
        .await
    }

    async fn react(&self, reaction: ReactionRequest) -> PlatformResult<()> {
        self.write_line(json!({
            "type": "reaction",
            "channel_id": reaction.channel_id,
            "message_id": reaction.message_id,
            "symbol": reaction.symbol,
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_parse_command_line() {
        let line = r#"{"type":"command","name":"count","invoker_id":"u1","target":"u2"}"#;
        assert_eq!(
            parse_line(line),
            Some(InboundEvent::Command(
                CommandInvocation::new("count", "u1").with_target("u2")
            ))
        );
    }

    #[test]
    fn test_parse_skips_blank_and_malformed() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("not json"), None);
        assert_eq!(parse_line(r#"{"type":"reaction"}"#), None);
    }

    #[tokio::test]
    async fn test_reader_yields_valid_lines_in_order() {
        let input: &[u8] = b"{\"type\":\"command\",\"name\":\"leaderboard\",\"invoker_id\":\"a\"}\n\
            garbage\n\
            \n\
            {\"type\":\"command\",\"name\":\"count\",\"invoker_id\":\"b\"}";

        let events: Vec<_> = events_from_reader(input).collect().await;

        assert_eq!(
            events,
            vec![
                InboundEvent::Command(CommandInvocation::new("leaderboard", "a")),
                InboundEvent::Command(CommandInvocation::new("count", "b")),
            ]
        );
    }

    #[tokio::test]
    async fn test_platform_writes_one_object_per_line() {
        let platform = ConsolePlatform::new(Vec::new());

        platform
            .respond(
                &CommandInvocation::new("count", "u1"),
                Response::new("You've said the magic word 3 times"),
            )
            .await
            .unwrap();
        platform
            .react(ReactionRequest {
                channel_id: "c".to_string(),
                message_id: "m".to_string(),
                symbol: "🍌".to_string(),
            })
            .await
            .unwrap();

        let written = String::from_utf8(platform.into_inner()).unwrap();
        let lines: Vec<Value> = written
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "response");
        assert_eq!(lines[0]["text"], "You've said the magic word 3 times");
        assert_eq!(lines[1]["type"], "reaction");
        assert_eq!(lines[1]["symbol"], "🍌");
    }
}
