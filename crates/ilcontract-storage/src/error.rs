//! Storage error types for ilcontract-storage.
//!
//! [`StorageError`] is fatal for the cache operation that raised it.
//! [`CacheFormatError`] describes a record that could not be decoded; the
//! cache treats such a record as a miss and reports it rather than failing.

use ilcontract_core::Fingerprint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A put tried to associate a fingerprint with a contract set different
    /// from the one already stored. Either the fingerprint does not cover
    /// everything that affects extraction, or extraction is not deterministic.
    #[error("cache inconsistency: fingerprint {fingerprint} already maps to a different contract set")]
    CacheInconsistency { fingerprint: Fingerprint },

    /// A record could not be decoded.
    #[error("cache record format error: {0}")]
    CacheFormat(#[from] CacheFormatError),

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite backend failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock was poisoned by a panicking writer.
    #[error("lock poisoned: {what}")]
    LockPoisoned { what: &'static str },
}

/// Why a stored record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CacheFormatError {
    #[error("record is {len} bytes, shorter than the {minimum}-byte header")]
    Truncated { len: usize, minimum: usize },

    #[error("bad record magic {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported record format version {found} (expected {expected})")]
    UnsupportedVersion { found: u16, expected: u16 },

    #[error("record checksum mismatch")]
    ChecksumMismatch,

    #[error("record payload is not a valid contract set: {reason}")]
    Payload { reason: String },
}
