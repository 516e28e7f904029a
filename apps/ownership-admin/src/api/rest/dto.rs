use modkit_ownership::{FormFields, HistoryEntry, RegisteredType};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::record::AdminRecord;

/// Submitted form data: field name to value.
pub type RecordForm = Map<String, Value>;

#[derive(Debug, Clone, Serialize)]
pub struct RecordDto {
    pub id: Option<Uuid>,
    pub owner: Option<Uuid>,
    pub fields: Map<String, Value>,
}

impl From<AdminRecord> for RecordDto {
    fn from(record: AdminRecord) -> Self {
        Self {
            id: record.id,
            owner: record.owner,
            fields: record.data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordListDto {
    pub record_type: String,
    pub records: Vec<RecordDto>,
}

/// Form to render for the add and change pages.
#[derive(Debug, Clone, Serialize)]
pub struct FormDto {
    pub record_type: String,
    pub fields: Vec<String>,
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<RecordDto>,
}

impl FormDto {
    #[must_use]
    pub fn new(registered: &RegisteredType, form: &FormFields, record: Option<AdminRecord>) -> Self {
        Self {
            record_type: registered.record_type().to_string(),
            fields: form.fields().to_vec(),
            exclude: form.exclude().to_vec(),
            record: record.map(RecordDto::from),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulkCreateRequest {
    pub items: Vec<RecordForm>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryDto {
    pub record_id: Uuid,
    pub entries: Vec<HistoryEntry>,
}

/// Entry of the admin index page.
#[derive(Debug, Clone, Serialize)]
pub struct RecordTypeDto {
    pub app_label: String,
    pub model_name: String,
    pub verbose_name: String,
    pub manage_permission: String,
    pub manage_permission_description: String,
    pub list_url: String,
}

impl From<&RegisteredType> for RecordTypeDto {
    fn from(registered: &RegisteredType) -> Self {
        let record_type = registered.record_type();
        Self {
            app_label: record_type.app_label().to_owned(),
            model_name: record_type.model_name().to_owned(),
            verbose_name: record_type.verbose_name().to_owned(),
            manage_permission: registered.manage_permission().to_string(),
            manage_permission_description: registered.manage_permission_description(),
            list_url: registered.list_redirect().location().to_owned(),
        }
    }
}
