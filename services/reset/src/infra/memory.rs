//! Process-local record store.
//!
//! Volatile: every challenge and token is lost on restart, and instances do
//! not see each other's records. Use the Redis backend for anything beyond a
//! single process.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::repository::ResetRecordStore;
use crate::domain::types::ResetRecord;
use crate::error::ResetError;

/// Sharded map keyed by identifier. Each operation holds only the shard lock
/// for its key.
#[derive(Clone, Default)]
pub struct MemoryResetStore {
    records: Arc<DashMap<String, ResetRecord>>,
}

impl MemoryResetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ResetRecordStore for MemoryResetStore {
    async fn get(&self, identifier: &str) -> Result<Option<ResetRecord>, ResetError> {
        Ok(self.records.get(identifier).map(|r| r.value().clone()))
    }

    async fn put(&self, record: &ResetRecord) -> Result<(), ResetError> {
        self.records
            .insert(record.identifier().to_owned(), record.clone());
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<(), ResetError> {
        self.records.remove(identifier);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        identifier: &str,
        expected: Option<&ResetRecord>,
        new: Option<&ResetRecord>,
    ) -> Result<bool, ResetError> {
        match self.records.entry(identifier.to_owned()) {
            Entry::Occupied(mut slot) => {
                if expected != Some(slot.get()) {
                    return Ok(false);
                }
                match new {
                    Some(record) => {
                        slot.insert(record.clone());
                    }
                    None => {
                        slot.remove();
                    }
                }
                Ok(true)
            }
            Entry::Vacant(slot) => {
                if expected.is_some() {
                    return Ok(false);
                }
                if let Some(record) = new {
                    slot.insert(record.clone());
                }
                Ok(true)
            }
        }
    }

    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, ResetError> {
        let before = self.records.len();
        self.records.retain(|_, record| !record.is_expired(now));
        Ok(before.saturating_sub(self.records.len()))
    }

    async fn ping(&self) -> Result<(), ResetError> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryResetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryResetStore")
            .field("records", &self.records.len())
            .finish()
    }
}
