//! Read-only queries and reply formatting.

use std::fmt::Write;

use crate::model::{UserId, UserRecord};

/// Reply shown when nobody has been counted yet.
pub const EMPTY_LEADERBOARD: &str = "Leaderboard empty, what a nice server!";

/// Whose count a single-user reply describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// The user who invoked the command.
    Invoker,
    /// A user named in the command.
    Other,
}

/// Formats the reply to a single-user count query.
pub fn format_single_user(record: Option<&UserRecord>, subject: Subject) -> String {
    match (record, subject) {
        (None, Subject::Invoker) => "You've never said it!".to_string(),
        (None, Subject::Other) => "The specified user has never said it!".to_string(),
        (Some(record), Subject::Invoker) => {
            format!("You've said the magic word {} times", record.count)
        }
        (Some(record), Subject::Other) => {
            format!("{} said the magic word {} times", record.name, record.count)
        }
    }
}

/// Orders entries by count, highest first.
///
/// The sort is stable: equal counts keep their input order, which is id
/// order when the input comes from
/// [`CountingStore::snapshot_all`](crate::CountingStore::snapshot_all).
pub fn rank(mut entries: Vec<(UserId, UserRecord)>) -> Vec<(UserId, UserRecord)> {
    entries.sort_by(|(_, a), (_, b)| b.count.cmp(&a.count));
    entries
}

/// Formats the leaderboard as one `name: count` line per user.
pub fn format_leaderboard(entries: Vec<(UserId, UserRecord)>) -> String {
    if entries.is_empty() {
        return EMPTY_LEADERBOARD.to_string();
    }

    let mut out = String::new();
    for (_, record) in rank(entries) {
        let _ = writeln!(out, "{}: {}", record.name, record.count);
    }
    out
}
