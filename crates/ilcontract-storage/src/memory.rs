//! In-memory implementation of [`ContractStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and single-run
//! batches where persistence isn't needed. Records live in a `DashMap`, so
//! readers and writers on different keys never block each other.

use dashmap::DashMap;

use ilcontract_core::Fingerprint;

use crate::error::StorageError;
use crate::traits::ContractStore;

/// In-memory record store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<Fingerprint, Vec<u8>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        InMemoryStore::default()
    }
}

impl ContractStore for InMemoryStore {
    fn load_record(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.get(fingerprint).map(|r| r.value().clone()))
    }

    fn store_record(&self, fingerprint: &Fingerprint, record: &[u8]) -> Result<(), StorageError> {
        self.records.insert(*fingerprint, record.to_vec());
        Ok(())
    }

    fn remove_record(&self, fingerprint: &Fingerprint) -> Result<bool, StorageError> {
        Ok(self.records.remove(fingerprint).is_some())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.records.clear();
        Ok(())
    }

    fn record_count(&self) -> Result<usize, StorageError> {
        Ok(self.records.len())
    }
}
