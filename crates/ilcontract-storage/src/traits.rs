//! The [`ContractStore`] trait defining the raw record storage contract.
//!
//! A store maps a method [`Fingerprint`] to an opaque record blob. It knows
//! nothing about contract sets, record formats, or content addressing; those
//! live in [`ContractCache`](crate::cache::ContractCache), which wraps any
//! store. Backends are therefore swappable without touching cache logic.

use ilcontract_core::Fingerprint;

use crate::error::StorageError;

/// Raw key/value storage for cache records.
///
/// Methods take `&self` so a single store can be shared across worker
/// threads behind an `Arc`. Each method is atomic with respect to the others
/// for a single key.
pub trait ContractStore: Send + Sync {
    /// Returns the record stored under `fingerprint`, if any.
    fn load_record(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `record` under `fingerprint`, replacing any existing record.
    fn store_record(&self, fingerprint: &Fingerprint, record: &[u8]) -> Result<(), StorageError>;

    /// Removes the record under `fingerprint`. Returns whether one existed.
    fn remove_record(&self, fingerprint: &Fingerprint) -> Result<bool, StorageError>;

    /// Removes every record.
    fn clear(&self) -> Result<(), StorageError>;

    /// Number of stored records.
    fn record_count(&self) -> Result<usize, StorageError>;
}
