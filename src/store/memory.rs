// src/store/memory.rs
use crate::error::StoreError;
use crate::record::Record;
use crate::store::RecordStore;

/// Process-local store; used for dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    committed: Vec<Record>,
    staged: Option<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.committed
    }

    pub fn in_transaction(&self) -> bool {
        self.staged.is_some()
    }

    /// Committed records as JSON documents, as a database would return them.
    pub fn entries(&self) -> Result<Vec<serde_json::Value>, StoreError> {
        self.committed
            .iter()
            .map(|r| serde_json::to_value(r).map_err(StoreError::from))
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        self.staged = Some(Vec::new());
        Ok(())
    }

    fn add(&mut self, record: &Record) -> Result<(), StoreError> {
        self.staged
            .as_mut()
            .ok_or(StoreError::NoTransaction)?
            .push(record.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let staged = self.staged.take().ok_or(StoreError::NoTransaction)?;
        self.committed.extend(staged);
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.staged = None;
        Ok(())
    }
}
