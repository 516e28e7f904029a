use crate::permission::Permission;
use crate::{AccessScope, PrivilegePolicyRef};
use uuid::Uuid;

/// `SecurityContext` encapsulates the identity acting on a request
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    subject_id: Uuid,
    username: Option<String>,
    is_superuser: bool,
    permissions: Vec<Permission>,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no subject or permissions
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    /// Get the subject ID (user, service, or system) associated with the security context
    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// True if no subject is attached to the context.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_nil()
    }

    /// Global superuser flag. Anonymous contexts are never superusers.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.is_superuser && !self.is_anonymous()
    }

    /// Get the permissions explicitly granted to the security context
    #[must_use]
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Returns true if `permission` was explicitly granted.
    #[must_use]
    pub fn holds_permission(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Permission lookup: superusers implicitly hold every permission,
    /// anonymous contexts hold none.
    #[must_use]
    pub fn has_permission(&self, permission: &Permission) -> bool {
        if self.is_anonymous() {
            return false;
        }
        self.is_superuser() || self.holds_permission(permission)
    }

    pub fn scope(&self, policy: PrivilegePolicyRef) -> AccessScopeResolver<'_> {
        AccessScopeResolver {
            policy,
            context: self,
            manage_permission: None,
        }
    }
}

pub struct AccessScopeResolver<'a> {
    policy: PrivilegePolicyRef,
    context: &'a SecurityContext,
    /// Manage permission of the record type being accessed.
    manage_permission: Option<&'a Permission>,
}

impl<'a> AccessScopeResolver<'a> {
    /// Resolve the scope for the record type guarded by `permission`.
    #[must_use]
    pub fn manage_permission(mut self, permission: &'a Permission) -> Self {
        self.manage_permission = Some(permission);
        self
    }

    /// Build the final `AccessScope`:
    /// - anonymous context: deny all
    /// - privileged for the record type: unrestricted
    /// - otherwise: records owned by the subject
    #[must_use]
    pub fn resolve(&self) -> AccessScope {
        if self.context.is_anonymous() {
            return AccessScope::default();
        }

        let privileged = match self.manage_permission {
            Some(permission) => self.policy.is_privileged(self.context, permission),
            None => self.context.is_superuser(),
        };

        if privileged {
            AccessScope::unrestricted()
        } else {
            AccessScope::owner(self.context.subject_id)
        }
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    subject_id: Option<Uuid>,
    username: Option<String>,
    is_superuser: bool,
    permissions: Vec<Permission>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = is_superuser;
        self
    }

    #[must_use]
    pub fn add_permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions.extend(permissions);
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            subject_id: self.subject_id.unwrap_or_default(),
            username: self.username,
            is_superuser: self.is_superuser,
            permissions: self.permissions,
        }
    }
}
