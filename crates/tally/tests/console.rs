use std::sync::Arc;

use serde_json::Value;
use tally::console::{ConsolePlatform, events_from_reader};
use tally::core::{Seed, decode};
use tally::runtime::{TallyConfig, TallyRuntime};

const INPUT: &str = r#"{"type":"message","channel_id":"c","message_id":"m1","author_id":"1","author_name":"Ann","content":"I want a BANANA"}
{"type":"message","channel_id":"c","message_id":"m2","author_id":"2","author_name":"Bo","is_bot":true,"content":"banana"}
{"type":"message","channel_id":"c","message_id":"m3","author_id":"1","author_name":"Ann","content":"apple"}
not an event
"#;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_console_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let mut config = TallyConfig::default();
    config.storage.data_file = path.clone();
    config.seed = Seed {
        trigger_words: vec!["banana".to_string()],
        reaction: "🍌".to_string(),
        token: String::new(),
    };
    let runtime = TallyRuntime::from_config(&config).unwrap();
    let platform = Arc::new(ConsolePlatform::new(Vec::new()));

    runtime
        .run(events_from_reader(INPUT.as_bytes()), platform.clone())
        .await
        .unwrap();

    let platform = Arc::try_unwrap(platform).ok().unwrap();
    let written = String::from_utf8(platform.into_inner()).unwrap();
    let lines: Vec<Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "reaction");
    assert_eq!(lines[0]["message_id"], "m1");
    assert_eq!(runtime.stats().messages.load(std::sync::atomic::Ordering::Relaxed), 3);

    let snapshot = decode(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(snapshot.users.len(), 1);
    assert_eq!(snapshot.users["1"].count, 1);
    assert_eq!(snapshot.users["1"].name, "Ann");
}
