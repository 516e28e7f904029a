#![allow(clippy::unwrap_used, clippy::expect_used)]

use modkit_security::{AccessScope, Permission, PrivilegeMode, SecurityContext};
use uuid::Uuid;

fn manager_of(permission: &Permission) -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .username("manager")
        .add_permission(permission.clone())
        .build()
}

#[test]
fn deny_all_for_anonymous() {
    let permission = Permission::manage("blog", "post").unwrap();
    let scope = SecurityContext::anonymous()
        .scope(PrivilegeMode::ManagePermission.policy())
        .manage_permission(&permission)
        .resolve();

    assert!(scope.is_empty());
}

#[test]
fn regular_user_is_scoped_to_own_records() {
    let permission = Permission::manage("blog", "post").unwrap();
    let user = Uuid::new_v4();
    let ctx = SecurityContext::builder().subject_id(user).build();

    for mode in [PrivilegeMode::ManagePermission, PrivilegeMode::Superuser] {
        let scope = ctx
            .scope(mode.policy())
            .manage_permission(&permission)
            .resolve();
        assert_eq!(scope, AccessScope::owner(user));
        assert_eq!(scope.owner_ids(), &[user]);
    }
}

#[test]
fn manage_permission_grants_unrestricted_scope_only_for_its_type() {
    let post = Permission::manage("blog", "post").unwrap();
    let comment = Permission::manage("blog", "comment").unwrap();
    let ctx = manager_of(&post);
    let policy = PrivilegeMode::ManagePermission.policy();

    let scope = ctx.scope(policy.clone()).manage_permission(&post).resolve();
    assert!(scope.is_unrestricted());

    let scope = ctx.scope(policy).manage_permission(&comment).resolve();
    assert_eq!(scope, AccessScope::owner(ctx.subject_id()));
}

#[test]
fn superuser_is_unrestricted_under_both_modes() {
    let post = Permission::manage("blog", "post").unwrap();
    let ctx = SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .superuser(true)
        .build();

    for mode in [PrivilegeMode::ManagePermission, PrivilegeMode::Superuser] {
        let scope = ctx.scope(mode.policy()).manage_permission(&post).resolve();
        assert!(scope.is_unrestricted());
    }
}
