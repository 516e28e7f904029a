use crate::{Permission, SecurityContext};
use std::sync::Arc;

/// Type alias for a reference-counted privilege policy
pub type PrivilegePolicyRef = Arc<dyn PrivilegePolicy>;

/// Decides whether a subject may act on every record of a type, not just its own.
pub trait PrivilegePolicy: Send + Sync {
    /// `manage_permission` is the record type's `<app>.can_manage_<model>` permission.
    fn is_privileged(&self, ctx: &SecurityContext, manage_permission: &Permission) -> bool;
}

/// Privileged iff the subject carries the global superuser flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperuserPolicy;

impl PrivilegePolicy for SuperuserPolicy {
    fn is_privileged(&self, ctx: &SecurityContext, _manage_permission: &Permission) -> bool {
        ctx.is_superuser()
    }
}

/// Privileged iff the subject has the record type's manage permission
/// (superusers have it implicitly).
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagePermissionPolicy;

impl PrivilegePolicy for ManagePermissionPolicy {
    fn is_privileged(&self, ctx: &SecurityContext, manage_permission: &Permission) -> bool {
        ctx.has_permission(manage_permission)
    }
}

/// Deployment-level selection of the privilege policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeMode {
    #[default]
    ManagePermission,
    Superuser,
}

impl PrivilegeMode {
    #[must_use]
    pub fn policy(self) -> PrivilegePolicyRef {
        match self {
            PrivilegeMode::ManagePermission => Arc::new(ManagePermissionPolicy),
            PrivilegeMode::Superuser => Arc::new(SuperuserPolicy),
        }
    }
}
