use async_trait::async_trait;
use modkit_security::AccessScope;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::OwnedRecord;

/// Filter over the records of one type: an owner scope plus an optional id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    scope: AccessScope,
    id: Option<Uuid>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self::all()
    }
}

impl RecordQuery {
    /// Every record, regardless of owner.
    #[must_use]
    pub fn all() -> Self {
        Self {
            scope: AccessScope::unrestricted(),
            id: None,
        }
    }

    /// Narrow to records inside `scope`.
    #[must_use]
    pub fn filter_scope(mut self, scope: &AccessScope) -> Self {
        self.scope = self.scope.narrow(scope);
        self
    }

    /// Narrow to records owned by `owner`.
    #[must_use]
    pub fn filter_owner(self, owner: Uuid) -> Self {
        self.filter_scope(&AccessScope::owner(owner))
    }

    /// Narrow to the record with primary key `id`.
    #[must_use]
    pub fn filter_id(mut self, id: Uuid) -> Self {
        self.id = match self.id {
            // Conflicting id filters match nothing.
            Some(existing) if existing != id => {
                self.scope = AccessScope::default();
                Some(existing)
            }
            _ => Some(id),
        };
        self
    }

    #[must_use]
    pub fn scope(&self) -> &AccessScope {
        &self.scope
    }

    #[must_use]
    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// Evaluate the filter against a single record.
    pub fn matches<R: OwnedRecord>(&self, record: &R) -> bool {
        if let Some(id) = self.id
            && record.id() != Some(id)
        {
            return false;
        }
        self.scope.allows_owner(record.owner())
    }
}

/// Kind of change recorded in a record's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Added,
    Changed,
    Deleted,
}

/// One entry of a record's change history.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    pub record_id: Uuid,
    pub actor: Uuid,
    pub action: HistoryAction,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl HistoryEntry {
    #[must_use]
    pub fn now(record_id: Uuid, actor: Uuid, action: HistoryAction) -> Self {
        Self {
            record_id,
            actor,
            action,
            at: OffsetDateTime::now_utc(),
        }
    }
}

/// Persistence contract for one record type.
///
/// Implementations append a history entry for every successful save and delete.
#[async_trait]
pub trait RecordStore<R: OwnedRecord>: Send + Sync {
    /// Persist the record on behalf of `actor`, assigning a primary key on first save.
    ///
    /// An update (`is_update`) of an id the store no longer holds fails with
    /// [`StoreError::NotFound`] instead of recreating the record.
    async fn save(&self, actor: Uuid, record: R, is_update: bool) -> Result<R, StoreError>;

    /// Records matching `query`, ordered by primary key.
    async fn fetch(&self, query: &RecordQuery) -> Result<Vec<R>, StoreError>;

    async fn exists(&self, query: &RecordQuery) -> Result<bool, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<R>, StoreError>;

    /// Returns false if no record had that id.
    async fn delete(&self, actor: Uuid, id: Uuid) -> Result<bool, StoreError>;

    /// History of a record, oldest first. Kept after the record is deleted.
    async fn history(&self, id: Uuid) -> Result<Vec<HistoryEntry>, StoreError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Note {
        id: Option<Uuid>,
        owner: Option<Uuid>,
    }

    impl OwnedRecord for Note {
        fn id(&self) -> Option<Uuid> {
            self.id
        }
        fn set_id(&mut self, id: Uuid) {
            self.id = Some(id);
        }
        fn owner(&self) -> Option<Uuid> {
            self.owner
        }
        fn set_owner(&mut self, owner: Uuid) {
            self.owner = Some(owner);
        }
    }

    #[test]
    fn all_matches_ownerless_records() {
        let note = Note {
            id: Some(Uuid::new_v4()),
            owner: None,
        };
        assert!(RecordQuery::all().matches(&note));
        assert!(!RecordQuery::all().filter_owner(Uuid::new_v4()).matches(&note));
    }

    #[test]
    fn owner_and_id_filters_combine() {
        let owner = Uuid::new_v4();
        let id = Uuid::new_v4();
        let note = Note {
            id: Some(id),
            owner: Some(owner),
        };

        assert!(RecordQuery::all().filter_owner(owner).filter_id(id).matches(&note));
        assert!(!RecordQuery::all()
            .filter_owner(owner)
            .filter_id(Uuid::new_v4())
            .matches(&note));
        assert!(!RecordQuery::all()
            .filter_owner(Uuid::new_v4())
            .filter_id(id)
            .matches(&note));
    }

    #[test]
    fn conflicting_id_filters_match_nothing() {
        let id = Uuid::new_v4();
        let note = Note {
            id: Some(id),
            owner: None,
        };

        let query = RecordQuery::all().filter_id(id).filter_id(Uuid::new_v4());
        assert!(!query.matches(&note));
        assert!(query.scope().is_empty());
    }
}
