//! SQLite implementation of [`ContractStore`].
//!
//! [`SqliteStore`] persists records in a single `contract_records` table in
//! WAL mode, so a cache survives across batch runs. Writes go through one
//! connection behind a mutex; every write is a single-row statement and
//! autocommits. Reads of a file database use a pool of read-only
//! connections, so they see the last committed state without waiting on an
//! in-flight write.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};

use ilcontract_core::Fingerprint;

use crate::error::StorageError;
use crate::traits::ContractStore;

/// Idle read connections kept open per store.
const MAX_IDLE_READERS: usize = 8;

/// SQLite-backed record store.
pub struct SqliteStore {
    writer: Mutex<Connection>,
    /// `None` for a private in-memory database, which other connections
    /// cannot open; reads then share the writer.
    readers: Option<ReaderPool>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.readers.as_ref().map(|pool| &pool.path))
            .finish_non_exhaustive()
    }
}

/// Read-only connections to one database file, opened on demand.
struct ReaderPool {
    path: PathBuf,
    idle: Mutex<Vec<Connection>>,
}

impl ReaderPool {
    fn checkout(&self) -> Result<Connection, StorageError> {
        let idle = self
            .idle
            .lock()
            .map_err(|_| StorageError::LockPoisoned {
                what: "sqlite reader pool",
            })?
            .pop();
        match idle {
            Some(conn) => Ok(conn),
            None => crate::schema::open_reader(&self.path),
        }
    }

    fn checkin(&self, conn: Connection) {
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < MAX_IDLE_READERS {
                idle.push(conn);
            }
        }
    }
}

impl SqliteStore {
    /// Opens (or creates) a cache database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = crate::schema::open_database(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite contract store");
        Ok(SqliteStore {
            writer: Mutex::new(conn),
            readers: Some(ReaderPool {
                path: path.to_path_buf(),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Opens a private in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = crate::schema::open_in_memory()?;
        Ok(SqliteStore {
            writer: Mutex::new(conn),
            readers: None,
        })
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.writer.lock().map_err(|_| StorageError::LockPoisoned {
            what: "sqlite connection",
        })
    }

    /// Runs a read-only query on a pooled reader, or on the writer when the
    /// database has no pool.
    fn read<T>(&self, query: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T, StorageError> {
        let Some(pool) = &self.readers else {
            let conn = self.writer()?;
            return Ok(query(&conn)?);
        };
        let conn = pool.checkout()?;
        let result = query(&conn);
        pool.checkin(conn);
        Ok(result?)
    }
}

impl ContractStore for SqliteStore {
    fn load_record(&self, fingerprint: &Fingerprint) -> Result<Option<Vec<u8>>, StorageError> {
        self.read(|conn| {
            conn.query_row(
                "SELECT payload FROM contract_records WHERE fingerprint = ?1",
                params![&fingerprint.as_bytes()[..]],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
        })
    }

    fn store_record(&self, fingerprint: &Fingerprint, record: &[u8]) -> Result<(), StorageError> {
        let conn = self.writer()?;
        conn.execute(
            "INSERT INTO contract_records (fingerprint, payload) VALUES (?1, ?2)
             ON CONFLICT(fingerprint) DO UPDATE SET
                payload = excluded.payload,
                created_at = datetime('now')",
            params![&fingerprint.as_bytes()[..], record],
        )?;
        Ok(())
    }

    fn remove_record(&self, fingerprint: &Fingerprint) -> Result<bool, StorageError> {
        let conn = self.writer()?;
        let removed = conn.execute(
            "DELETE FROM contract_records WHERE fingerprint = ?1",
            params![&fingerprint.as_bytes()[..]],
        )?;
        Ok(removed > 0)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let conn = self.writer()?;
        conn.execute("DELETE FROM contract_records", [])?;
        Ok(())
    }

    fn record_count(&self) -> Result<usize, StorageError> {
        // A count outside `usize` fails as `IntegralValueOutOfRange`.
        self.read(|conn| {
            conn.query_row("SELECT COUNT(*) FROM contract_records", [], |row| {
                row.get::<_, usize>(0)
            })
        })
    }
}
