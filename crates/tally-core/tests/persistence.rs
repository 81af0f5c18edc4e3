use std::sync::Arc;
use std::thread;

use tally_core::{CountingStore, Seed, StoreError, UserRecord, decode};

fn seed() -> Seed {
    Seed {
        trigger_words: vec!["banana".to_string()],
        reaction: "🍌".to_string(),
        token: "token".to_string(),
    }
}

#[test]
fn test_missing_file_starts_from_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let store = CountingStore::open(&path, &seed()).unwrap();
    assert_eq!(store.user_count(), 0);
    assert_eq!(store.reaction(), "🍌");
    assert_eq!(store.token(), "token");
    assert!(!path.exists());
}

#[test]
fn test_malformed_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"{ this is not json").unwrap();

    let err = CountingStore::open(&path, &seed()).unwrap_err();
    assert!(matches!(err, StoreError::CorruptSnapshot { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_empty_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, b"").unwrap();

    assert!(matches!(
        CountingStore::open(&path, &seed()),
        Err(StoreError::CorruptSnapshot { .. })
    ));
}

#[test]
fn test_increment_is_persisted_and_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.json");

    {
        let store = CountingStore::open(&path, &seed()).unwrap();
        let recorded = store
            .record_if_triggered("7", "alice", "banana split")
            .unwrap();
        assert!(recorded.persisted.is_ok());
        store.record_if_triggered("7", "alice", "BANANA");
    }

    let reopened = CountingStore::open(&path, &Seed::default()).unwrap();
    assert_eq!(reopened.lookup("7"), Some(UserRecord::new("alice", 2)));
    assert_eq!(reopened.trigger_words().collect::<Vec<_>>(), vec!["banana"]);
    assert!(!dir.path().join("nested").join("data.json.tmp").exists());
}

#[test]
fn test_non_matching_message_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");

    let store = CountingStore::open(&path, &seed()).unwrap();
    assert!(store.record_if_triggered("1", "alice", "apple").is_none());
    assert!(!path.exists());
}

#[test]
fn test_unreadable_snapshot_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::create_dir(&path).unwrap();

    let err = CountingStore::open(&path, &seed()).unwrap_err();
    assert!(matches!(err, StoreError::Read { .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_write_failure_keeps_in_memory_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = CountingStore::open(&path, &seed()).unwrap();

    // A non-empty directory in place of the snapshot makes the rename fail.
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("occupant"), b"x").unwrap();

    let recorded = store.record_if_triggered("1", "alice", "banana").unwrap();
    assert!(matches!(
        recorded.persisted,
        Err(StoreError::PersistWrite { .. })
    ));
    assert_eq!(store.lookup("1").unwrap().count, 1);
    assert!(!dir.path().join("data.json.tmp").exists());

    std::fs::remove_dir_all(&path).unwrap();
    let recorded = store.record_if_triggered("1", "alice", "banana").unwrap();
    assert_eq!(recorded.count, 2);
    assert!(recorded.persisted.is_ok());

    let on_disk = decode(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk.users["1"].count, 2);
}

#[test]
fn test_concurrent_distinct_users_are_all_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let store = Arc::new(CountingStore::open(&path, &seed()).unwrap());

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let id = format!("user-{i}");
                store
                    .record_if_triggered(&id, &id, "Banana!")
                    .unwrap()
                    .persisted
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let all = store.snapshot_all();
    assert_eq!(all.len(), 32);
    assert!(all.iter().all(|(id, record)| record.count == 1 && &record.name == id));

    let on_disk = decode(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(on_disk, store.snapshot());
}

#[test]
fn test_concurrent_same_user_loses_no_updates() {
    let store = Arc::new(CountingStore::in_memory(tally_core::Snapshot::seeded(
        &seed(),
    )));

    thread::scope(|scope| {
        for _ in 0..8 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                let mut last = 0;
                for _ in 0..100 {
                    let count = store
                        .record_if_triggered("1", "alice", "banana")
                        .unwrap()
                        .count;
                    assert!(count > last);
                    last = count;
                }
            });
        }
    });

    assert_eq!(store.lookup("1").unwrap().count, 800);
}
