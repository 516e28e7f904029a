use modkit_ownership::OwnedRecord;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Schemaless admin record: owner plus the declared fields as JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminRecord {
    pub id: Option<Uuid>,
    pub owner: Option<Uuid>,
    pub data: Map<String, Value>,
}

impl OwnedRecord for AdminRecord {
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
