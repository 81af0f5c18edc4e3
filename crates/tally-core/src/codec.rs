//! Snapshot codec.
//!
//! Snapshots are stored as pretty-printed JSON:
//!
//! ```json
//! {
//!   "users": { "1234": { "name": "alice", "count": 3 } },
//!   "words": ["banana"],
//!   "emoji": "🍌",
//!   "token": "..."
//! }
//! ```
//!
//! Missing fields decode to their defaults, so a file without a `users`
//! object yields an empty table.

use crate::error::{CodecError, CodecResult};
use crate::model::Snapshot;

/// Serializes a snapshot.
///
/// Never fails for a snapshot built through this crate; the `Result` only
/// surfaces serializer errors.
pub fn encode(snapshot: &Snapshot) -> CodecResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(snapshot).map_err(CodecError::Encode)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Deserializes a snapshot, failing with [`CodecError::Malformed`] on
/// anything that is not a snapshot document.
pub fn decode(bytes: &[u8]) -> CodecResult<Snapshot> {
    serde_json::from_slice(bytes).map_err(CodecError::Malformed)
}
