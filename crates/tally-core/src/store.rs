//! The concurrency-safe counting store.
//!
//! A single [`CountingStore`] is shared (behind an `Arc`) by every event
//! handler. The locking discipline is:
//!
//! - [`lookup`](CountingStore::lookup) and
//!   [`snapshot_all`](CountingStore::snapshot_all) take the read lock.
//! - [`record_if_triggered`](CountingStore::record_if_triggered) takes the
//!   write lock for the increment, downgrades it to a read lock to encode a
//!   consistent snapshot, then releases it before touching the disk.
//!
//! Disk writes are serialized by a separate writer lock. Each mutation is
//! tagged with a generation number, and a write whose generation is not
//! newer than the last one on disk is skipped, so the file never moves
//! backwards.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use tracing::{debug, info, trace, warn};

use crate::codec;
use crate::error::{StoreError, StoreResult};
use crate::model::{Seed, Snapshot, UserId, UserRecord};

/// Result of a message that contained a trigger word.
#[derive(Debug)]
pub struct Recorded {
    /// The sender's count after the increment.
    pub count: u64,
    /// The configured trigger word that matched.
    pub trigger: String,
    /// Outcome of the durability write. The increment stands either way.
    pub persisted: StoreResult<()>,
}

struct State {
    snapshot: Snapshot,
    generation: u64,
}

/// Shared counter table with snapshot persistence.
pub struct CountingStore {
    state: RwLock<State>,
    /// Case-folded, non-empty trigger words in priority order.
    triggers: Vec<(String, String)>,
    reaction: String,
    token: String,
    path: Option<PathBuf>,
    /// Generation of the last snapshot written to `path`.
    written: Mutex<u64>,
}

impl CountingStore {
    /// Opens the store backed by the snapshot file at `path`.
    ///
    /// A missing file starts an empty store configured from `seed`. A file
    /// that exists but cannot be read or decoded is an error; counters are
    /// never guessed.
    pub fn open(path: impl Into<PathBuf>, seed: &Seed) -> StoreResult<Self> {
        let path = path.into();

        let snapshot = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot =
                    codec::decode(&bytes).map_err(|source| StoreError::CorruptSnapshot {
                        path: path.clone(),
                        source,
                    })?;
                info!(
                    path = %path.display(),
                    users = snapshot.users.len(),
                    "Loaded snapshot"
                );
                snapshot
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No snapshot found, starting empty");
                Snapshot::seeded(seed)
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        Ok(Self::build(snapshot, Some(path)))
    }

    /// Creates a store that lives only in memory. Persists are no-ops.
    pub fn in_memory(snapshot: Snapshot) -> Self {
        Self::build(snapshot, None)
    }

    fn build(snapshot: Snapshot, path: Option<PathBuf>) -> Self {
        let mut triggers = Vec::with_capacity(snapshot.trigger_words.len());
        for word in &snapshot.trigger_words {
            if word.is_empty() {
                warn!("Ignoring empty trigger word");
                continue;
            }
            triggers.push((fold_case(word), word.clone()));
        }

        if triggers.is_empty() {
            warn!("No trigger words configured, messages will never be counted");
        }

        Self {
            reaction: snapshot.reaction.clone(),
            token: snapshot.token.clone(),
            triggers,
            path,
            written: Mutex::new(0),
            state: RwLock::new(State {
                snapshot,
                generation: 0,
            }),
        }
    }

    /// Counts a message if it contains a trigger word.
    ///
    /// Trigger words are checked in configured order using case-insensitive
    /// substring matching; the first hit counts and at most one increment
    /// happens per call. Returns `None` when nothing matched, in which case
    /// neither the table nor the disk is touched.
    pub fn record_if_triggered(
        &self,
        user_id: &str,
        display_name: &str,
        text: &str,
    ) -> Option<Recorded> {
        let text = fold_case(text);
        let (_, trigger) = self
            .triggers
            .iter()
            .find(|(lowered, _)| text.contains(lowered.as_str()))?;

        let mut state = self.state.write();
        let record = state.snapshot.users.entry(user_id.to_string()).or_default();
        record.count = record.count.saturating_add(1);
        record.name.clear();
        record.name.push_str(display_name);
        let count = record.count;
        state.generation += 1;
        let generation = state.generation;

        // Readers may proceed while the snapshot is encoded; other writers wait.
        let state = RwLockWriteGuard::downgrade(state);
        let encoded = codec::encode(&state.snapshot);
        drop(state);

        debug!(user_id, count, trigger = %trigger, "Trigger word counted");

        let persisted = encoded
            .map_err(StoreError::from)
            .and_then(|bytes| self.persist(generation, &bytes));

        Some(Recorded {
            count,
            trigger: trigger.clone(),
            persisted,
        })
    }

    /// Returns the record for `user_id`, if the user was ever counted.
    pub fn lookup(&self, user_id: &str) -> Option<UserRecord> {
        self.state.read().snapshot.users.get(user_id).cloned()
    }

    /// Returns a point-in-time copy of every record, ordered by user id.
    pub fn snapshot_all(&self) -> Vec<(UserId, UserRecord)> {
        self.state
            .read()
            .snapshot
            .users
            .iter()
            .map(|(id, record)| (id.clone(), record.clone()))
            .collect()
    }

    /// Returns a copy of the complete state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().snapshot.clone()
    }

    /// Returns the number of users with a record.
    pub fn user_count(&self) -> usize {
        self.state.read().snapshot.users.len()
    }

    /// Returns the configured trigger words, empty entries excluded.
    pub fn trigger_words(&self) -> impl Iterator<Item = &str> {
        self.triggers.iter().map(|(_, word)| word.as_str())
    }

    /// Returns the configured reaction symbol.
    pub fn reaction(&self) -> &str {
        &self.reaction
    }

    /// Returns the platform authentication token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the snapshot location, if the store is file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self, generation: u64, bytes: &[u8]) -> StoreResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };

        let mut written = self.written.lock();
        if *written >= generation {
            trace!(generation, written = *written, "Newer snapshot already on disk");
            return Ok(());
        }

        write_atomic(path, bytes).map_err(|source| StoreError::PersistWrite {
            path: path.to_path_buf(),
            source,
        })?;
        *written = generation;

        trace!(generation, path = %path.display(), "Snapshot written");
        Ok(())
    }
}

impl std::fmt::Debug for CountingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountingStore")
            .field("path", &self.path)
            .field("users", &self.user_count())
            .field("triggers", &self.triggers.len())
            .finish_non_exhaustive()
    }
}

/// Lowercases one character at a time.
///
/// Unlike [`str::to_lowercase`] this ignores context-dependent rules such as
/// the Greek final sigma, so a lowered trigger word is always found inside
/// lowered text that contains it.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Writes `bytes` to a sibling temp file, syncs it and renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let written = File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    path.with_file_name(name)
}
