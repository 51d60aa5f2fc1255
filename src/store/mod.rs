// src/store/mod.rs
pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::record::Record;

/// Storage collaborator records are handed to, one insert per record.
pub trait RecordStore {
    fn begin(&mut self) -> Result<(), StoreError>;
    fn add(&mut self, record: &Record) -> Result<(), StoreError>;
    fn commit(&mut self) -> Result<(), StoreError>;
    fn rollback(&mut self) -> Result<(), StoreError>;
}

/// One persistence step against a store. Begins on open; rolls back on
/// drop unless [`Session::commit`] succeeded.
pub struct Session<'a, S: RecordStore + ?Sized> {
    store: &'a mut S,
    staged: usize,
    committed: bool,
}

impl<'a, S: RecordStore + ?Sized> Session<'a, S> {
    pub fn open(store: &'a mut S) -> Result<Self, StoreError> {
        store.begin()?;
        Ok(Self {
            store,
            staged: 0,
            committed: false,
        })
    }

    pub fn add(&mut self, record: &Record) -> Result<(), StoreError> {
        self.store.add(record)?;
        self.staged += 1;
        Ok(())
    }

    /// Commit everything staged and return how many records that was.
    pub fn commit(mut self) -> Result<usize, StoreError> {
        self.store.commit()?;
        self.committed = true;
        Ok(self.staged)
    }
}

impl<S: RecordStore + ?Sized> Drop for Session<'_, S> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        debug!(staged = self.staged, "rolling back");
        if let Err(e) = self.store.rollback() {
            warn!(error = %e, "rollback failed");
        }
    }
}
