use crate::record::RecordType;

/// Redirect to a named admin route, resolved to its location up front.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Redirect {
    route_name: String,
    location: String,
}

impl Redirect {
    #[must_use]
    pub fn new(route_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            route_name: route_name.into(),
            location: location.into(),
        }
    }

    /// The list page of a record type: route `admin:<app>_<model>_changelist`,
    /// location `<prefix>/<app>/<model>/`.
    #[must_use]
    pub fn changelist(admin_prefix: &str, record_type: &RecordType) -> Self {
        let app = record_type.app_label();
        let model = record_type.model_name();
        let prefix = admin_prefix.trim_end_matches('/');
        Self::new(
            format!("admin:{app}_{model}_changelist"),
            format!("{prefix}/{app}/{model}/"),
        )
    }

    #[must_use]
    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}
