//! Content-addressable cache of extracted contract sets.
//!
//! [`ContractCache`] sits on top of any [`ContractStore`] and adds:
//!
//! - record encoding through [`codec`](crate::codec)
//! - content addressing: once a fingerprint maps to an extraction, a put of
//!   a different one for it is an error, not an overwrite
//! - per-key writer exclusion, so concurrent puts of the same fingerprint
//!   resolve to exactly one write while distinct keys never contend
//!
//! A record holds the whole [`Extraction`] (accepted clauses plus the
//! diagnostics for rejected ones), so a hit reports the same outcome as the
//! extraction that produced it. Records that fail to decode (old format
//! version, corruption) are treated as misses and replaced by the next put.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use ilcontract_core::{ContractSet, Extraction, Fingerprint};

use crate::codec;
use crate::error::{CacheFormatError, StorageError};
use crate::memory::InMemoryStore;
use crate::sqlite::SqliteStore;
use crate::traits::ContractStore;

/// Result of [`ContractCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Hit(Extraction),
    Miss,
    /// A record exists but cannot be decoded. Callers should extract again.
    Stale(CacheFormatError),
}

/// Result of a successful [`ContractCache::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No record existed; the value was written.
    Stored,
    /// An equal value was already stored; nothing was written.
    Unchanged,
    /// An undecodable record was overwritten.
    Replaced,
}

/// Content-addressed cache from method fingerprint to extraction result.
///
/// Shared across worker threads behind an `Arc`.
pub struct ContractCache {
    store: Arc<dyn ContractStore>,
    /// Writer locks, one per fingerprint with an operation in flight.
    key_locks: DashMap<Fingerprint, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for ContractCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractCache")
            .field("keys_locked", &self.key_locks.len())
            .finish_non_exhaustive()
    }
}

impl ContractCache {
    pub fn new(store: Arc<dyn ContractStore>) -> Self {
        ContractCache {
            store,
            key_locks: DashMap::new(),
        }
    }

    /// A cache backed by a fresh [`InMemoryStore`].
    pub fn in_memory() -> Self {
        ContractCache::new(Arc::new(InMemoryStore::new()))
    }

    /// A cache backed by a [`SqliteStore`] at `path`.
    pub fn open_sqlite(path: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        Ok(ContractCache::new(Arc::new(SqliteStore::open(path)?)))
    }

    pub fn store(&self) -> &Arc<dyn ContractStore> {
        &self.store
    }

    /// Looks up `fingerprint`, distinguishing undecodable records from misses.
    pub fn lookup(&self, fingerprint: &Fingerprint) -> Result<Lookup, StorageError> {
        let Some(record) = self.store.load_record(fingerprint)? else {
            tracing::debug!(%fingerprint, "cache miss");
            return Ok(Lookup::Miss);
        };
        match codec::decode(&record) {
            Ok(extraction) => {
                tracing::debug!(
                    %fingerprint,
                    clauses = extraction.contracts.len(),
                    rejected = extraction.diagnostics.len(),
                    "cache hit"
                );
                Ok(Lookup::Hit(extraction))
            }
            Err(err) => {
                tracing::warn!(%fingerprint, error = %err, "stale cache record treated as miss");
                Ok(Lookup::Stale(err))
            }
        }
    }

    /// Returns the cached contract set for `fingerprint`.
    ///
    /// `None` means the caller must extract; that includes records that
    /// exist but cannot be decoded.
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<ContractSet>, StorageError> {
        match self.lookup(fingerprint)? {
            Lookup::Hit(extraction) => Ok(Some(extraction.contracts)),
            Lookup::Miss | Lookup::Stale(_) => Ok(None),
        }
    }

    /// Associates `fingerprint` with `set` and no rejected clauses.
    ///
    /// Same as [`put_extraction`](Self::put_extraction) with an
    /// [`Extraction`] that has no diagnostics.
    pub fn put(&self, fingerprint: &Fingerprint, set: &ContractSet) -> Result<PutOutcome, StorageError> {
        self.put_extraction(fingerprint, &Extraction::from(set.clone()))
    }

    /// Associates `fingerprint` with `extraction`.
    ///
    /// Putting a value equal to the stored one is a no-op. Putting a
    /// different one fails with [`StorageError::CacheInconsistency`] and
    /// leaves the stored value in place. Concurrent puts for the same
    /// fingerprint are serialized; the first writer wins.
    pub fn put_extraction(
        &self,
        fingerprint: &Fingerprint,
        extraction: &Extraction,
    ) -> Result<PutOutcome, StorageError> {
        self.with_key_lock(fingerprint, || self.put_locked(fingerprint, extraction))
    }

    fn put_locked(&self, fingerprint: &Fingerprint, extraction: &Extraction) -> Result<PutOutcome, StorageError> {
        let outcome = match self.store.load_record(fingerprint)? {
            None => PutOutcome::Stored,
            Some(record) => match codec::decode(&record) {
                Ok(existing) if existing == *extraction => {
                    tracing::debug!(%fingerprint, "cache put unchanged");
                    return Ok(PutOutcome::Unchanged);
                }
                Ok(_) => {
                    tracing::error!(%fingerprint, "different extraction for cached fingerprint");
                    return Err(StorageError::CacheInconsistency {
                        fingerprint: *fingerprint,
                    });
                }
                Err(err) => {
                    tracing::warn!(%fingerprint, error = %err, "replacing stale cache record");
                    PutOutcome::Replaced
                }
            },
        };
        self.store.store_record(fingerprint, &codec::encode(extraction)?)?;
        tracing::debug!(%fingerprint, clauses = extraction.contracts.len(), ?outcome, "cache put");
        Ok(outcome)
    }

    /// Removes the record for `fingerprint`. Returns whether one existed.
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> Result<bool, StorageError> {
        self.with_key_lock(fingerprint, || self.store.remove_record(fingerprint))
    }

    /// Removes every record.
    pub fn invalidate_all(&self) -> Result<(), StorageError> {
        self.store.clear()?;
        tracing::info!("contract cache flushed");
        Ok(())
    }

    /// Number of records in the backing store.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.store.record_count()
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Runs `f` while holding the writer lock for `fingerprint`.
    fn with_key_lock<T>(
        &self,
        fingerprint: &Fingerprint,
        f: impl FnOnce() -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let lock = Arc::clone(self.key_locks.entry(*fingerprint).or_default().value());
        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(StorageError::LockPoisoned { what: "cache key" }),
        };
        drop(lock);
        // Drop the table entry once no other thread holds or waits on it.
        self.key_locks
            .remove_if(fingerprint, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    #[cfg(test)]
    fn locked_keys(&self) -> usize {
        self.key_locks.len()
    }
}
