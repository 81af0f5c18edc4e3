//! Error types for the codec and the counting store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while encoding or decoding a snapshot.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input is not a valid snapshot document.
    #[error("malformed snapshot: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The snapshot could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A snapshot file exists but cannot be parsed. Fatal at startup.
    #[error("corrupt snapshot at {path}: {source}")]
    CorruptSnapshot {
        /// Snapshot location.
        path: PathBuf,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },

    /// A snapshot file exists but cannot be read.
    #[error("failed to read snapshot at {path}: {source}")]
    Read {
        /// Snapshot location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Writing the snapshot failed. The in-memory state is unaffected.
    #[error("failed to write snapshot to {path}: {source}")]
    PersistWrite {
        /// Snapshot location.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded before writing.
    #[error(transparent)]
    Encode(#[from] CodecError),
}

impl StoreError {
    /// Returns `true` for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptSnapshot { .. } | Self::Read { .. })
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
