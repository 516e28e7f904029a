use modkit_security::PrivilegeMode;
use serde::{Deserialize, Serialize};

use crate::guard::OwnerAssignment;

/// Ownership guard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnershipConfig {
    /// How privileged subjects are recognized
    #[serde(default)]
    pub privilege: PrivilegeMode,

    /// When a privileged subject's identity is filled in as owner
    #[serde(default)]
    pub owner_assignment: OwnerAssignment,

    /// Path prefix the admin routes are mounted under
    #[serde(default = "default_admin_prefix")]
    pub admin_prefix: String,

    /// Record types guarded by ownership
    #[serde(default)]
    pub record_types: Vec<RecordTypeConfig>,
}

fn default_admin_prefix() -> String {
    "/admin".to_owned()
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            privilege: PrivilegeMode::default(),
            owner_assignment: OwnerAssignment::default(),
            admin_prefix: default_admin_prefix(),
            record_types: Vec::new(),
        }
    }
}

/// Static declaration of one guarded record type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordTypeConfig {
    pub app_label: String,
    pub model_name: String,
    #[serde(default)]
    pub verbose_name: Option<String>,
    /// Editable fields besides `owner`
    #[serde(default)]
    pub fields: Vec<String>,
}
