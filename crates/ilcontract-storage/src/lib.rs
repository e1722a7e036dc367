//! Content-addressable storage for extracted contract sets.
//!
//! Provides the [`ContractStore`] trait defining the raw record contract,
//! the [`InMemoryStore`] and [`SqliteStore`] backends, and the
//! [`ContractCache`] that enforces content addressing on top of any store.
//!
//! # Modules
//!
//! - [`error`]: StorageError and CacheFormatError
//! - [`codec`]: versioned, checksummed record envelope
//! - [`traits`]: ContractStore trait definition
//! - [`memory`]: InMemoryStore implementation
//! - [`schema`]: SQL migrations for the SQLite backend
//! - [`sqlite`]: SqliteStore implementation
//! - [`cache`]: ContractCache

pub mod cache;
pub mod codec;
pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use cache::{ContractCache, Lookup, PutOutcome};
pub use error::{CacheFormatError, StorageError};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::ContractStore;
