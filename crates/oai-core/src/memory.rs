//! In-memory record store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::Result;
use crate::repo::{SetDescriptor, StoredRecord};
use crate::traits::{RecordFilter, RecordStore};
use crate::types::Identifier;

/// An immutable, cheaply clonable record store held in memory.
///
/// Useful for tests and for embedding small, static collections.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use oai_core::{Identifier, MemoryStore, SetSpec, StoredRecord};
/// use oai_core::repo::SetDescriptor;
///
/// let store = MemoryStore::new()
///     .with_set(SetDescriptor::new(SetSpec::new("maps").unwrap(), "Maps"))
///     .with_record(StoredRecord::new(Identifier::new("oai:x:1").unwrap(), Utc::now()));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<BTreeMap<Identifier, StoredRecord>>,
    sets: Arc<Vec<SetDescriptor>>,
}

impl MemoryStore {
    /// An empty store with no records and no sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn with_record(mut self, record: StoredRecord) -> Self {
        Arc::make_mut(&mut self.records).insert(record.identifier.clone(), record);
        self
    }

    /// Add many records.
    pub fn with_records(self, records: impl IntoIterator<Item = StoredRecord>) -> Self {
        records.into_iter().fold(self, Self::with_record)
    }

    /// Add or replace a set.
    pub fn with_set(mut self, set: SetDescriptor) -> Self {
        let sets = Arc::make_mut(&mut self.sets);
        sets.retain(|s| s.spec != set.spec);
        sets.push(set);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn record(&self, identifier: &Identifier) -> Result<Option<StoredRecord>> {
        Ok(self.records.get(identifier).cloned())
    }

    async fn scan(&self, filter: &RecordFilter) -> Result<Vec<StoredRecord>> {
        Ok(self
            .records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn sets(&self) -> Result<Vec<SetDescriptor>> {
        Ok(self.sets.as_ref().clone())
    }

    async fn earliest_datestamp(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.records.values().map(|r| r.datestamp).min())
    }
}
