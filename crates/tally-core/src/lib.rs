//! Tally Core - the counting engine behind the Tally bot.
//!
//! This crate provides:
//! - The persisted data model (`Snapshot`, `UserRecord`)
//! - The snapshot codec (`codec::encode`, `codec::decode`)
//! - The concurrency-safe counting store (`CountingStore`)
//! - Read-only queries and reply formatting (`query`)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                CountingStore                 │
//! │  RwLock<Snapshot>  ──copy──►  persist writer │
//! └───────┬──────────────────────────┬───────────┘
//!         │ lookup / snapshot_all    │ encode
//!         ▼                          ▼
//!     query::*                  codec (JSON)
//! ```
//!
//! Nothing in this crate knows about chat platforms; it deals purely in user
//! ids, display names and message text.

pub mod codec;
pub mod error;
pub mod model;
pub mod query;
pub mod store;

pub use codec::{decode, encode};
pub use error::{CodecError, CodecResult, StoreError, StoreResult};
pub use model::{Seed, Snapshot, UserId, UserRecord};
pub use query::{EMPTY_LEADERBOARD, Subject, format_leaderboard, format_single_user, rank};
pub use store::{CountingStore, Recorded, fold_case};
