//! Owned records and the static record-type registry.
//!
//! Every record type guarded by ownership is declared once at startup. The
//! registration computes the type's manage permission and its list redirect,
//! both reused for every request afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use modkit_security::{OWNER_FIELD, Permission};
use uuid::Uuid;

use crate::config::{OwnershipConfig, RecordTypeConfig};
use crate::error::RegistryError;
use crate::redirect::Redirect;

/// A persisted entity carrying an optional owner.
pub trait OwnedRecord: Clone + Send + Sync + 'static {
    /// Primary key; `None` until the record is first persisted.
    fn id(&self) -> Option<Uuid>;

    fn set_id(&mut self, id: Uuid);

    fn owner(&self) -> Option<Uuid>;

    fn set_owner(&mut self, owner: Uuid);
}

/// Identity of a record type: `app_label` + `model_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordType {
    app_label: String,
    model_name: String,
    verbose_name: String,
}

impl RecordType {
    /// Verbose name defaults to the model name with underscores as spaces.
    #[must_use]
    pub fn new(app_label: &str, model_name: &str) -> Self {
        Self {
            app_label: app_label.to_owned(),
            model_name: model_name.to_owned(),
            verbose_name: model_name.replace('_', " "),
        }
    }

    #[must_use]
    pub fn with_verbose_name(mut self, verbose_name: &str) -> Self {
        verbose_name.clone_into(&mut self.verbose_name);
        self
    }

    #[must_use]
    pub fn app_label(&self) -> &str {
        &self.app_label
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn verbose_name(&self) -> &str {
        &self.verbose_name
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app_label, self.model_name)
    }
}

/// A record type after registration, with its derived names cached.
#[derive(Debug, Clone)]
pub struct RegisteredType {
    record_type: RecordType,
    manage_permission: Permission,
    fields: Vec<String>,
    list_redirect: Redirect,
}

impl RegisteredType {
    /// # Errors
    ///
    /// Returns an error if a label is invalid, a field is declared twice, or
    /// the reserved `owner` field is declared explicitly.
    pub fn new(
        record_type: RecordType,
        fields: Vec<String>,
        admin_prefix: &str,
    ) -> Result<Self, RegistryError> {
        let manage_permission =
            Permission::manage(record_type.app_label(), record_type.model_name()).map_err(
                |source| RegistryError::InvalidRecordType {
                    record_type: record_type.to_string(),
                    source,
                },
            )?;

        for (i, field) in fields.iter().enumerate() {
            if field == OWNER_FIELD {
                return Err(RegistryError::ReservedField {
                    record_type: record_type.to_string(),
                    field: field.clone(),
                });
            }
            if fields[..i].contains(field) {
                return Err(RegistryError::DuplicateField {
                    record_type: record_type.to_string(),
                    field: field.clone(),
                });
            }
        }

        let list_redirect = Redirect::changelist(admin_prefix, &record_type);

        Ok(Self {
            record_type,
            manage_permission,
            fields,
            list_redirect,
        })
    }

    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// `<app_label>.can_manage_<model_name>`
    #[must_use]
    pub fn manage_permission(&self) -> &Permission {
        &self.manage_permission
    }

    /// Human-readable description of the manage permission.
    #[must_use]
    pub fn manage_permission_description(&self) -> String {
        format!("Can manage {}", self.record_type.verbose_name())
    }

    /// Editable fields, not counting `owner`.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn list_redirect(&self) -> &Redirect {
        &self.list_redirect
    }
}

/// Registry of every ownership-guarded record type, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RecordTypeRegistry {
    types: BTreeMap<(String, String), Arc<RegisteredType>>,
}

impl RecordTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns an error if any declared record type is invalid or declared twice.
    pub fn from_config(config: &OwnershipConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for record_type in &config.record_types {
            registry.register_config(record_type, &config.admin_prefix)?;
        }
        Ok(registry)
    }

    /// # Errors
    ///
    /// Returns an error if the record type is invalid or already registered.
    pub fn register_config(
        &mut self,
        cfg: &RecordTypeConfig,
        admin_prefix: &str,
    ) -> Result<Arc<RegisteredType>, RegistryError> {
        let mut record_type = RecordType::new(&cfg.app_label, &cfg.model_name);
        if let Some(verbose_name) = &cfg.verbose_name {
            record_type = record_type.with_verbose_name(verbose_name);
        }
        self.register(RegisteredType::new(
            record_type,
            cfg.fields.clone(),
            admin_prefix,
        )?)
    }

    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` if the record type is already registered.
    pub fn register(
        &mut self,
        registered: RegisteredType,
    ) -> Result<Arc<RegisteredType>, RegistryError> {
        let key = (
            registered.record_type.app_label.clone(),
            registered.record_type.model_name.clone(),
        );
        if self.types.contains_key(&key) {
            return Err(RegistryError::Duplicate(registered.record_type.to_string()));
        }

        tracing::debug!(
            record_type = %registered.record_type,
            permission = %registered.manage_permission,
            "registered ownership-guarded record type"
        );

        let registered = Arc::new(registered);
        self.types.insert(key, registered.clone());
        Ok(registered)
    }

    /// # Errors
    ///
    /// Returns `RegistryError::NotRegistered` for unknown record types.
    pub fn get(&self, app_label: &str, model_name: &str) -> Result<Arc<RegisteredType>, RegistryError> {
        self.types
            .get(&(app_label.to_owned(), model_name.to_owned()))
            .cloned()
            .ok_or_else(|| RegistryError::NotRegistered(format!("{app_label}.{model_name}")))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredType>> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every manage permission declared by the registered types, with its description.
    #[must_use]
    pub fn permission_catalog(&self) -> Vec<(Permission, String)> {
        self.iter()
            .map(|t| (t.manage_permission().clone(), t.manage_permission_description()))
            .collect()
    }
}
