//! Registered record types and their stores.

use std::collections::BTreeMap;
use std::sync::Arc;

use modkit_ownership::{
    InMemoryStore, OwnershipConfig, OwnershipError, OwnershipGuard, RecordStore,
    RecordTypeRegistry, RegistryError,
};

use super::record::AdminRecord;

/// Guard and store of one record type.
pub struct ModelAdmin {
    guard: OwnershipGuard,
    store: Arc<dyn RecordStore<AdminRecord>>,
}

impl ModelAdmin {
    #[must_use]
    pub fn new(guard: OwnershipGuard, store: Arc<dyn RecordStore<AdminRecord>>) -> Self {
        Self { guard, store }
    }

    #[must_use]
    pub fn guard(&self) -> &OwnershipGuard {
        &self.guard
    }

    #[must_use]
    pub fn store(&self) -> &dyn RecordStore<AdminRecord> {
        self.store.as_ref()
    }
}

/// Every admin-managed record type, keyed by `(app_label, model_name)`.
pub struct AdminSite {
    registry: RecordTypeRegistry,
    models: BTreeMap<(String, String), ModelAdmin>,
    admin_prefix: String,
}

impl AdminSite {
    /// Register the configured record types, each backed by an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if a record type is invalid or declared twice.
    pub fn from_config(config: &OwnershipConfig) -> Result<Self, RegistryError> {
        let registry = RecordTypeRegistry::from_config(config)?;
        let policy = config.privilege.policy();

        let models = registry
            .iter()
            .map(|registered| {
                let key = (
                    registered.record_type().app_label().to_owned(),
                    registered.record_type().model_name().to_owned(),
                );
                let guard =
                    OwnershipGuard::new(registered.clone(), policy.clone(), config.owner_assignment);
                let store: Arc<dyn RecordStore<AdminRecord>> = Arc::new(InMemoryStore::new());
                (key, ModelAdmin::new(guard, store))
            })
            .collect();

        tracing::info!(
            record_types = registry.len(),
            privilege = ?config.privilege,
            owner_assignment = ?config.owner_assignment,
            "admin site ready"
        );

        Ok(Self {
            registry,
            models,
            admin_prefix: config.admin_prefix.trim_end_matches('/').to_owned(),
        })
    }

    /// # Errors
    ///
    /// Returns `OwnershipError::NotFound` for unregistered record types.
    pub fn model_admin(&self, app_label: &str, model_name: &str) -> Result<&ModelAdmin, OwnershipError> {
        self.models
            .get(&(app_label.to_owned(), model_name.to_owned()))
            .ok_or_else(|| {
                RegistryError::NotRegistered(format!("{app_label}.{model_name}")).into()
            })
    }

    #[must_use]
    pub fn registry(&self) -> &RecordTypeRegistry {
        &self.registry
    }

    /// Admin mount point without a trailing slash; empty for the root.
    #[must_use]
    pub fn admin_prefix(&self) -> &str {
        &self.admin_prefix
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use modkit_ownership::RecordTypeConfig;

    fn config(prefix: &str) -> OwnershipConfig {
        OwnershipConfig {
            admin_prefix: prefix.to_owned(),
            record_types: vec![RecordTypeConfig {
                app_label: "blog".to_owned(),
                model_name: "post".to_owned(),
                verbose_name: None,
                fields: vec!["title".to_owned()],
            }],
            ..OwnershipConfig::default()
        }
    }

    #[test]
    fn registered_types_get_a_model_admin() {
        let site = AdminSite::from_config(&config("/admin/")).unwrap();

        let admin = site.model_admin("blog", "post").unwrap();
        assert_eq!(
            admin.guard().record_type().manage_permission().to_string(),
            "blog.can_manage_post"
        );
        assert_eq!(site.admin_prefix(), "/admin");
        assert_eq!(site.registry().len(), 1);
    }

    #[test]
    fn unknown_type_is_not_found() {
        let site = AdminSite::from_config(&config("/admin")).unwrap();
        assert!(matches!(
            site.model_admin("blog", "comment"),
            Err(OwnershipError::NotFound(_))
        ));
    }
}
