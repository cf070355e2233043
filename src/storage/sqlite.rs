//! SQLite storage backend for contact-book.
//!
//! Implements `ContactBackend` using rusqlite (bundled). A single connection
//! is guarded by a `parking_lot::Mutex`; every operation is one statement so
//! no transaction spans more than one lock acquisition.

use parking_lot::Mutex;
use rusqlite::{params, OptionalExtension};

use crate::error::{ContactError, Result, StorageError};
use crate::types::{Contact, ContactId, SortType};

use super::traits::ContactBackend;

const SELECT_COLS: &str = "SELECT id, first_name, last_name, phone_number FROM contacts";

/// Map a rusqlite error to a `ContactError`.
fn storage_err(e: rusqlite::Error) -> ContactError {
    ContactError::Storage(StorageError::Sqlite(e))
}

// ============================================================================
// SqliteBackend
// ============================================================================

/// SQLite storage backend.
pub struct SqliteBackend {
    conn: Mutex<rusqlite::Connection>,
    initialized: bool,
}

impl SqliteBackend {
    /// Open a file-backed SQLite database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = rusqlite::Connection::open(path).map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            initialized: false,
        })
    }

    /// Open an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            initialized: false,
        })
    }

    /// Create the contacts table and one index per sortable column.
    pub fn initialize(&mut self) -> Result<()> {
        {
            let conn = self.conn.lock();

            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA busy_timeout=5000;",
            )
            .map_err(storage_err)?;

            conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS contacts (
                    id           TEXT PRIMARY KEY NOT NULL,
                    first_name   TEXT NOT NULL,
                    last_name    TEXT NOT NULL,
                    phone_number TEXT NOT NULL
                );",
            )
            .map_err(storage_err)?;

            for sort in SortType::ALL {
                let column = sort.column();
                conn.execute_batch(&format!(
                    "CREATE INDEX IF NOT EXISTS idx_contacts_{column} ON contacts ({column}, id)"
                ))
                .map_err(storage_err)?;
            }
        }

        self.initialized = true;
        Ok(())
    }

    /// Returns whether `initialize()` has been called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Execute `f` with the connection, failing fast before `initialize()`.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>,
    {
        if !self.initialized {
            return Err(StorageError::NotInitialized.into());
        }
        let conn = self.conn.lock();
        f(&conn).map_err(storage_err)
    }

    /// Parse a single rusqlite row into a `Contact`.
    fn row_to_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
        let id: String = row.get(0)?;
        Ok(Contact {
            id: ContactId::from(id),
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            phone_number: row.get(3)?,
        })
    }
}

impl ContactBackend for SqliteBackend {
    fn get_raw(&self, id: &ContactId) -> Result<Option<Contact>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT_COLS} WHERE id = ?1"),
                params![id.as_str()],
                Self::row_to_contact,
            )
            .optional()
        })
    }

    fn put_raw(&self, contact: &Contact) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contacts (id, first_name, last_name, phone_number) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(id) DO UPDATE SET \
                    first_name = excluded.first_name, \
                    last_name = excluded.last_name, \
                    phone_number = excluded.phone_number",
                params![
                    contact.id.as_str(),
                    contact.first_name,
                    contact.last_name,
                    contact.phone_number,
                ],
            )?;
            Ok(())
        })
    }

    fn delete_raw(&self, id: &ContactId) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM contacts WHERE id = ?1", params![id.as_str()])?;
            Ok(changed > 0)
        })
    }

    fn scan_ordered(&self, sort: SortType) -> Result<Vec<Contact>> {
        // `column()` comes from a closed enum, so interpolation is safe.
        let sql = format!("{SELECT_COLS} ORDER BY {} ASC, id ASC", sort.column());
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt.query_map([], Self::row_to_contact)?;
            rows.collect()
        })
    }

    fn count_raw(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
            Ok(n as usize)
        })
    }
}
