#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod access_scope;
pub mod constants;
pub mod context;
pub mod permission;
pub mod privilege;

pub use access_scope::AccessScope;
pub use constants::{MANAGE_PERMISSION_PREFIX, OWNER_FIELD};
pub use context::{AccessScopeResolver, SecurityContext, SecurityContextBuilder};
pub use permission::{Permission, PermissionError};
pub use privilege::{
    ManagePermissionPolicy, PrivilegeMode, PrivilegePolicy, PrivilegePolicyRef, SuperuserPolicy,
};
