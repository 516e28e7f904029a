#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end ownership rules against the in-memory store.

use std::sync::Arc;

use modkit_ownership::{
    Guarded, InMemoryStore, OwnedRecord, OwnerAssignment, OwnershipConfig, OwnershipGuard,
    HistoryAction, RecordQuery, RecordStore, RecordTypeConfig, RecordTypeRegistry, StoreError,
};
use modkit_security::{Permission, PrivilegeMode, SecurityContext};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq)]
struct Article {
    id: Option<Uuid>,
    owner: Option<Uuid>,
    title: String,
}

impl OwnedRecord for Article {
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

fn article(owner: Option<Uuid>, title: &str) -> Article {
    Article {
        id: None,
        owner,
        title: title.to_owned(),
    }
}

fn guard_for(mode: PrivilegeMode) -> OwnershipGuard {
    let config = OwnershipConfig {
        privilege: mode,
        record_types: vec![RecordTypeConfig {
            app_label: "news".to_owned(),
            model_name: "article".to_owned(),
            verbose_name: None,
            fields: vec!["title".to_owned()],
        }],
        ..OwnershipConfig::default()
    };
    let registry = RecordTypeRegistry::from_config(&config).unwrap();
    OwnershipGuard::new(
        registry.get("news", "article").unwrap(),
        config.privilege.policy(),
        config.owner_assignment,
    )
}

fn user() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .username("writer")
        .build()
}

fn editor() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .username("editor")
        .add_permission(Permission::manage("news", "article").unwrap())
        .build()
}

fn superuser() -> SecurityContext {
    SecurityContext::builder()
        .subject_id(Uuid::new_v4())
        .username("root")
        .superuser(true)
        .build()
}

async fn noop(_id: Uuid) -> Result<(), StoreError> {
    Ok(())
}

#[tokio::test]
async fn regular_user_overwrites_any_owner_on_save() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = InMemoryStore::new();
    let me = user();

    for (owner, is_update) in [
        (None, false),
        (Some(Uuid::new_v4()), false),
        (Some(Uuid::new_v4()), true),
    ] {
        let saved = guard
            .save_model(&me, &store, article(owner, "t"), is_update)
            .await
            .unwrap();
        assert_eq!(saved.owner, Some(me.subject_id()));
    }
}

#[tokio::test]
async fn privileged_update_keeps_existing_owner() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = InMemoryStore::new();
    let author = user();
    let boss = editor();

    let created = guard
        .save_model(&author, &store, article(None, "draft"), false)
        .await
        .unwrap();

    let mut edited = created.clone();
    edited.title = "final".to_owned();
    let saved = guard.save_model(&boss, &store, edited, true).await.unwrap();

    assert_eq!(saved.owner, Some(author.subject_id()));
    assert_eq!(saved.title, "final");
}

#[tokio::test]
async fn privileged_new_record_without_owner_gets_actor() {
    for (mode, ctx) in [
        (PrivilegeMode::ManagePermission, editor()),
        (PrivilegeMode::Superuser, superuser()),
    ] {
        let guard = guard_for(mode);
        let store = InMemoryStore::new();

        let saved = guard
            .save_model(&ctx, &store, article(None, "t"), false)
            .await
            .unwrap();
        assert_eq!(saved.owner, Some(ctx.subject_id()));
    }
}

#[tokio::test]
async fn manage_permission_does_not_count_under_superuser_mode() {
    let guard = guard_for(PrivilegeMode::Superuser);
    let store = InMemoryStore::new();
    let boss = editor();
    let someone = Uuid::new_v4();

    let saved = guard
        .save_model(&boss, &store, article(Some(someone), "t"), false)
        .await
        .unwrap();

    assert!(!guard.is_privileged(&boss));
    assert_eq!(saved.owner, Some(boss.subject_id()));
}

#[tokio::test]
async fn list_view_returns_exactly_own_records() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = InMemoryStore::new();
    let (alice, bob) = (user(), user());

    for ctx in [&alice, &bob, &alice] {
        guard
            .save_model(ctx, &store, article(None, "t"), false)
            .await
            .unwrap();
    }
    store
        .save(Uuid::new_v4(), article(None, "orphan"), false)
        .await
        .unwrap();

    let mine = store
        .fetch(&guard.list_view(&alice, RecordQuery::all()))
        .await
        .unwrap();
    assert_eq!(mine.len(), 2);
    assert!(mine.iter().all(|a| a.owner == Some(alice.subject_id())));

    let everything = store
        .fetch(&guard.list_view(&editor(), RecordQuery::all()))
        .await
        .unwrap();
    assert_eq!(everything.len(), 4);
}

#[tokio::test]
async fn hidden_and_missing_ids_redirect_identically() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = InMemoryStore::new();
    let (alice, bob) = (user(), user());

    let bobs = guard
        .save_model(&bob, &store, article(None, "bob's"), false)
        .await
        .unwrap();
    let bobs_id = bobs.id.unwrap().to_string();
    let missing_id = Uuid::new_v4().to_string();

    for object_id in [bobs_id.as_str(), missing_id.as_str()] {
        let change = guard.change_view(&alice, &store, object_id, noop).await.unwrap();
        let delete = guard.delete_view(&alice, &store, object_id, noop).await.unwrap();
        let history = guard.history_view(&alice, &store, object_id, noop).await.unwrap();

        for outcome in [change, delete, history] {
            match outcome {
                Guarded::Redirect(redirect) => {
                    assert_eq!(redirect.route_name(), "admin:news_article_changelist");
                    assert_eq!(redirect.location(), "/admin/news/article/");
                }
                Guarded::Allowed(()) => panic!("hidden record must redirect"),
            }
        }
    }
}

#[tokio::test]
async fn owner_and_privileged_reach_the_view() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = InMemoryStore::new();
    let alice = user();

    let saved = guard
        .save_model(&alice, &store, article(None, "mine"), false)
        .await
        .unwrap();
    let id = saved.id.unwrap();

    for ctx in [&alice, &editor(), &superuser()] {
        let outcome = guard
            .change_view(ctx, &store, &id.to_string(), |seen| async move {
                Ok::<_, StoreError>(seen)
            })
            .await
            .unwrap();
        assert_eq!(outcome, Guarded::Allowed(id));
    }
}

#[tokio::test]
async fn scenario_create_edit_and_forbidden_delete() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = Arc::new(InMemoryStore::new());
    let u1 = user();
    let u2 = editor();

    // U1 saves R1 without an owner.
    let r1 = guard
        .save_model(&u1, &*store, article(None, "r1"), false)
        .await
        .unwrap();
    assert_eq!(r1.owner, Some(u1.subject_id()));

    // U2 (privileged) edits an unrelated field; owner stays U1.
    let mut edit = r1.clone();
    edit.title = "r1 edited".to_owned();
    let r1 = guard
        .save_model(&u2, &*store, edit, true)
        .await
        .unwrap();
    assert_eq!(r1.owner, Some(u1.subject_id()));

    // R2 belongs to U2; U1 tries to delete it.
    let r2 = guard
        .save_model(&u2, &*store, article(None, "r2"), false)
        .await
        .unwrap();
    let r2_id = r2.id.unwrap();

    let delete_store = store.clone();
    let actor = u1.subject_id();
    let outcome = guard
        .delete_view(&u1, &*store, &r2_id.to_string(), |id| async move {
            delete_store.delete(actor, id).await
        })
        .await
        .unwrap();

    assert!(outcome.is_redirect());
    assert_eq!(store.get(r2_id).await.unwrap(), Some(r2));
}

#[tokio::test]
async fn when_missing_policy_fills_owner_on_update() {
    let registry = RecordTypeRegistry::from_config(&OwnershipConfig {
        record_types: vec![RecordTypeConfig {
            app_label: "news".to_owned(),
            model_name: "article".to_owned(),
            verbose_name: None,
            fields: vec![],
        }],
        ..OwnershipConfig::default()
    })
    .unwrap();
    let registered = registry.get("news", "article").unwrap();
    let store = InMemoryStore::new();
    let orphan = store
        .save(Uuid::new_v4(), article(None, "orphan"), false)
        .await
        .unwrap();
    let boss = editor();

    let on_create = OwnershipGuard::new(
        registered.clone(),
        PrivilegeMode::ManagePermission.policy(),
        OwnerAssignment::OnCreate,
    );
    let saved = on_create
        .save_model(&boss, &store, orphan.clone(), true)
        .await
        .unwrap();
    assert_eq!(saved.owner, None);

    let when_missing = OwnershipGuard::new(
        registered,
        PrivilegeMode::ManagePermission.policy(),
        OwnerAssignment::WhenMissing,
    );
    let saved = when_missing
        .save_model(&boss, &store, orphan, true)
        .await
        .unwrap();
    assert_eq!(saved.owner, Some(boss.subject_id()));
}

#[tokio::test]
async fn concurrent_forms_are_request_scoped() {
    let guard = Arc::new(guard_for(PrivilegeMode::ManagePermission));
    let mut handles = Vec::new();

    for i in 0..32 {
        let guard = guard.clone();
        handles.push(tokio::spawn(async move {
            let ctx = if i % 2 == 0 { user() } else { editor() };
            let form = guard.get_form(&ctx);
            tokio::task::yield_now().await;
            (i % 2 == 0, form.is_excluded("owner"))
        }));
    }

    for handle in handles {
        let (is_regular, excluded) = handle.await.unwrap();
        assert_eq!(is_regular, excluded);
    }
}

#[tokio::test]
async fn guarded_saves_and_deletes_leave_a_history() {
    let guard = guard_for(PrivilegeMode::ManagePermission);
    let store = Arc::new(InMemoryStore::new());
    let (author, boss) = (user(), editor());

    let created = guard
        .save_model(&author, &*store, article(None, "draft"), false)
        .await
        .unwrap();
    let id = created.id.unwrap();
    guard
        .save_model(&boss, &*store, created, true)
        .await
        .unwrap();

    let history_store = store.clone();
    let trail = guard
        .history_view(&author, &*store, &id.to_string(), |id| async move {
            history_store.history(id).await
        })
        .await
        .unwrap()
        .allowed()
        .unwrap();
    let trail: Vec<_> = trail.iter().map(|e| (e.action, e.actor)).collect();
    assert_eq!(
        trail,
        vec![
            (HistoryAction::Added, author.subject_id()),
            (HistoryAction::Changed, boss.subject_id()),
        ]
    );

    let delete_store = store.clone();
    let actor = author.subject_id();
    let deleted = guard
        .delete_view(&author, &*store, &id.to_string(), |id| async move {
            delete_store.delete(actor, id).await
        })
        .await
        .unwrap();
    assert_eq!(deleted, Guarded::Allowed(true));

    let last = store.history(id).await.unwrap().pop().unwrap();
    assert_eq!((last.action, last.actor), (HistoryAction::Deleted, actor));
}
