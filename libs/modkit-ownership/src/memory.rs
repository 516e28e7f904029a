//! In-memory reference implementation of [`RecordStore`].

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::OwnedRecord;
use crate::store::{HistoryAction, HistoryEntry, RecordQuery, RecordStore};

/// `DashMap`-backed store. Primary keys are UUID v7, so key order is creation order.
pub struct InMemoryStore<R: OwnedRecord> {
    records: DashMap<Uuid, R>,
    history: DashMap<Uuid, Vec<HistoryEntry>>,
}

impl<R: OwnedRecord> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            history: DashMap::new(),
        }
    }
}

impl<R: OwnedRecord> InMemoryStore<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn append_history(&self, id: Uuid, actor: Uuid, action: HistoryAction) {
        self.history
            .entry(id)
            .or_default()
            .push(HistoryEntry::now(id, actor, action));
    }
}

#[async_trait]
impl<R: OwnedRecord> RecordStore<R> for InMemoryStore<R> {
    async fn save(&self, actor: Uuid, mut record: R, is_update: bool) -> Result<R, StoreError> {
        let (id, fresh) = if let Some(id) = record.id() {
            (id, false)
        } else {
            let id = Uuid::now_v7();
            record.set_id(id);
            (id, true)
        };

        let action = match self.records.entry(id) {
            Entry::Occupied(mut slot) => {
                slot.insert(record.clone());
                HistoryAction::Changed
            }
            Entry::Vacant(_) if is_update && !fresh => {
                debug!(record_id = %id, "update of a record that is gone");
                return Err(StoreError::NotFound(id));
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                HistoryAction::Added
            }
        };

        self.append_history(id, actor, action);
        Ok(record)
    }

    async fn fetch(&self, query: &RecordQuery) -> Result<Vec<R>, StoreError> {
        if let Some(id) = query.id() {
            return Ok(self
                .records
                .get(&id)
                .filter(|r| query.matches(r.value()))
                .map(|r| r.value().clone())
                .into_iter()
                .collect());
        }

        let mut found: Vec<(Uuid, R)> = self
            .records
            .iter()
            .filter(|r| query.matches(r.value()))
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        Ok(found.into_iter().map(|(_, r)| r).collect())
    }

    async fn exists(&self, query: &RecordQuery) -> Result<bool, StoreError> {
        if let Some(id) = query.id() {
            return Ok(self
                .records
                .get(&id)
                .is_some_and(|r| query.matches(r.value())));
        }
        Ok(self.records.iter().any(|r| query.matches(r.value())))
    }

    async fn get(&self, id: Uuid) -> Result<Option<R>, StoreError> {
        Ok(self.records.get(&id).map(|r| r.value().clone()))
    }

    async fn delete(&self, actor: Uuid, id: Uuid) -> Result<bool, StoreError> {
        if self.records.remove(&id).is_none() {
            return Ok(false);
        }
        self.append_history(id, actor, HistoryAction::Deleted);
        Ok(true)
    }

    async fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self
            .history
            .get(&id)
            .map(|h| h.value().clone())
            .unwrap_or_default())
    }
}
