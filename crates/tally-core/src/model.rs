//! Persisted data model.
//!
//! The serialized field names (`words`, `emoji`, `token`) are the on-disk
//! names used by existing data files and must not change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque, stable platform identifier of a user.
pub type UserId = String;

/// Counter state for a single user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Most recently observed display name.
    pub name: String,
    /// Number of messages that contained a trigger word.
    pub count: u64,
}

impl UserRecord {
    /// Creates a record with the given name and count.
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// The complete store state, as written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Counters keyed by user id.
    pub users: BTreeMap<UserId, UserRecord>,

    /// Trigger words in match priority order.
    #[serde(rename = "words")]
    pub trigger_words: Vec<String>,

    /// Symbol used to react to triggering messages.
    #[serde(rename = "emoji")]
    pub reaction: String,

    /// Platform authentication token.
    pub token: String,
}

impl Snapshot {
    /// Creates an empty snapshot carrying the seed's configuration.
    pub fn seeded(seed: &Seed) -> Self {
        Self {
            users: BTreeMap::new(),
            trigger_words: seed.trigger_words.clone(),
            reaction: seed.reaction.clone(),
            token: seed.token.clone(),
        }
    }

    /// Adds a user record (builder pattern).
    pub fn with_user(mut self, id: impl Into<UserId>, record: UserRecord) -> Self {
        self.users.insert(id.into(), record);
        self
    }
}

/// Configuration used to initialise a store when no snapshot exists yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    /// Trigger words in match priority order.
    pub trigger_words: Vec<String>,
    /// Reaction symbol.
    pub reaction: String,
    /// Platform authentication token.
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_snapshot_has_no_users() {
        let seed = Seed {
            trigger_words: vec!["banana".to_string()],
            reaction: "🍌".to_string(),
            token: "secret".to_string(),
        };

        let snapshot = Snapshot::seeded(&seed);
        assert!(snapshot.users.is_empty());
        assert_eq!(snapshot.trigger_words, vec!["banana"]);
        assert_eq!(snapshot.reaction, "🍌");
        assert_eq!(snapshot.token, "secret");
    }
}
