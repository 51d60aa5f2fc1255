// src/store/sqlite.rs
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

use crate::error::StoreError;
use crate::record::Record;
use crate::store::RecordStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS crm_entries (
    id   INTEGER PRIMARY KEY,
    data TEXT NOT NULL
);
";

/// Records as JSON documents in a single `crm_entries` table.
pub struct SqliteStore {
    conn: Connection,
    in_transaction: bool,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!(db = %path.display(), "opening store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wrap an existing connection, creating the table if missing.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            in_transaction: false,
        })
    }

    /// Every stored document, oldest first.
    pub fn entries(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM crm_entries ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, serde_json::Value>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM crm_entries", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

// `rusqlite::Transaction` borrows the connection for its whole lifetime, so a
// transaction spanning separate begin/add/commit calls is driven with raw
// BEGIN/COMMIT/ROLLBACK statements instead.
impl RecordStore for SqliteStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch("BEGIN")?;
        self.in_transaction = true;
        Ok(())
    }

    fn add(&mut self, record: &Record) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        let data = serde_json::to_string(record)?;
        self.conn
            .execute("INSERT INTO crm_entries (data) VALUES (?1)", params![data])?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Err(StoreError::NoTransaction);
        }
        self.conn.execute_batch("COMMIT")?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}
