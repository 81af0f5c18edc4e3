use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tally_core::{CountingStore, Seed, Snapshot};
use tally_framework::{
    CommandInvocation, InboundEvent, MessageEvent, Platform, PlatformError, PlatformResult,
    ReactionRequest, Response, Router, deliver,
};

/// Records responses and rejects every reaction.
#[derive(Default)]
struct FlakyPlatform {
    responses: Mutex<Vec<(String, Response)>>,
    reaction_attempts: Mutex<usize>,
}

#[async_trait]
impl Platform for FlakyPlatform {
    async fn respond(
        &self,
        invocation: &CommandInvocation,
        response: Response,
    ) -> PlatformResult<()> {
        self.responses
            .lock()
            .push((invocation.invoker_id.clone(), response));
        Ok(())
    }

    async fn react(&self, _reaction: ReactionRequest) -> PlatformResult<()> {
        *self.reaction_attempts.lock() += 1;
        Err(PlatformError::delivery("rate limited"))
    }
}

fn router() -> Router {
    let snapshot = Snapshot {
        trigger_words: vec!["banana".to_string()],
        reaction: "🍌".to_string(),
        ..Default::default()
    };
    Router::new(Arc::new(CountingStore::in_memory(snapshot)))
}

fn message(author: usize) -> InboundEvent {
    InboundEvent::Message(MessageEvent {
        channel_id: "general".to_string(),
        message_id: format!("m{author}"),
        author_id: format!("u{author}"),
        author_name: format!("user {author}"),
        is_bot: false,
        is_system: false,
        content: "BANANA time".to_string(),
    })
}

async fn handle(router: Router, platform: Arc<FlakyPlatform>, event: InboundEvent) {
    let outbound = {
        let router = router.clone();
        let event = event.clone();
        tokio::task::spawn_blocking(move || router.handle(&event))
            .await
            .unwrap()
    };
    deliver(platform.as_ref(), &event, outbound).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_messages_from_distinct_users() {
    let router = router();
    let platform = Arc::new(FlakyPlatform::default());

    let tasks: Vec<_> = (0..64)
        .map(|i| tokio::spawn(handle(router.clone(), Arc::clone(&platform), message(i))))
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let all = router.store().snapshot_all();
    assert_eq!(all.len(), 64);
    assert!(all.iter().all(|(_, record)| record.count == 1));
    assert_eq!(*platform.reaction_attempts.lock(), 64);
}

#[tokio::test]
async fn test_reaction_failure_keeps_count_and_commands_still_answer() {
    let router = router();
    let platform = Arc::new(FlakyPlatform::default());

    handle(router.clone(), Arc::clone(&platform), message(1)).await;
    handle(
        router.clone(),
        Arc::clone(&platform),
        InboundEvent::Command(CommandInvocation::new("count", "u1")),
    )
    .await;
    handle(
        router.clone(),
        Arc::clone(&platform),
        InboundEvent::Command(CommandInvocation::new("unknown", "u1")),
    )
    .await;

    let responses = platform.responses.lock();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].0, "u1");
    assert_eq!(responses[0].1.text, "You've said the magic word 1 times");
}

#[tokio::test]
async fn test_counts_never_decrease() {
    let router = router();
    let platform = Arc::new(FlakyPlatform::default());

    let mut last = 0;
    for _ in 0..5 {
        handle(router.clone(), Arc::clone(&platform), message(7)).await;
        let count = router.store().lookup("u7").unwrap().count;
        assert!(count > last);
        last = count;
    }
    assert_eq!(last, 5);
}

#[test]
fn test_failed_snapshot_write_still_requests_reaction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let seed = Seed {
        trigger_words: vec!["banana".to_string()],
        reaction: "🍌".to_string(),
        token: String::new(),
    };
    let router = Router::new(Arc::new(CountingStore::open(&path, &seed).unwrap()));

    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupant"), b"x").unwrap();

    let InboundEvent::Message(msg) = message(7) else {
        unreachable!()
    };
    let reaction = router.handle_message(&msg).unwrap();

    assert_eq!(reaction.message_id, "m7");
    assert_eq!(reaction.symbol, "🍌");
    assert_eq!(router.store().lookup("u7").unwrap().count, 1);
}
