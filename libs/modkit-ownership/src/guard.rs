//! Ownership guard for the admin interface.
//!
//! Regular subjects only see and edit records they own and are always
//! recorded as owner of what they save. Privileged subjects (as decided by
//! the injected [`PrivilegePolicy`](modkit_security::PrivilegePolicy)) see
//! everything and may choose the owner themselves.
//!
//! Direct navigation to a record the subject cannot see (change, delete,
//! history) redirects to the list page. Missing and foreign ids produce the
//! same redirect, so ids cannot be enumerated.

use std::future::Future;
use std::sync::Arc;

use modkit_security::{AccessScope, OWNER_FIELD, PrivilegePolicyRef, SecurityContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{OwnedRecord, RegisteredType};
use crate::redirect::Redirect;
use crate::store::{RecordQuery, RecordStore};

/// When a privileged subject is filled in as owner of the record it saves.
///
/// Regular subjects always become owner, whatever this is set to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerAssignment {
    /// Only for an ownerless record saved for the first time.
    #[default]
    OnCreate,
    /// For any ownerless record, new or existing.
    WhenMissing,
}

/// Editable fields of a form, computed per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFields {
    fields: Vec<String>,
    exclude: Vec<String>,
}

impl FormFields {
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    #[must_use]
    pub fn permits(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    #[must_use]
    pub fn is_excluded(&self, field: &str) -> bool {
        self.exclude.iter().any(|f| f == field)
    }
}

/// Outcome of a guarded direct-access operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Allowed(T),
    Redirect(Redirect),
}

impl<T> Guarded<T> {
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self, Guarded::Redirect(_))
    }

    #[must_use]
    pub fn allowed(self) -> Option<T> {
        match self {
            Guarded::Allowed(v) => Some(v),
            Guarded::Redirect(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum DirectView {
    Change,
    Delete,
    History,
}

impl DirectView {
    fn as_str(self) -> &'static str {
        match self {
            DirectView::Change => "change",
            DirectView::Delete => "delete",
            DirectView::History => "history",
        }
    }
}

/// Ownership guard bound to one registered record type.
#[derive(Clone)]
pub struct OwnershipGuard {
    record_type: Arc<RegisteredType>,
    policy: PrivilegePolicyRef,
    assignment: OwnerAssignment,
}

impl OwnershipGuard {
    #[must_use]
    pub fn new(
        record_type: Arc<RegisteredType>,
        policy: PrivilegePolicyRef,
        assignment: OwnerAssignment,
    ) -> Self {
        Self {
            record_type,
            policy,
            assignment,
        }
    }

    #[must_use]
    pub fn record_type(&self) -> &RegisteredType {
        &self.record_type
    }

    #[must_use]
    pub fn owner_assignment(&self) -> OwnerAssignment {
        self.assignment
    }

    #[must_use]
    pub fn is_privileged(&self, ctx: &SecurityContext) -> bool {
        self.policy
            .is_privileged(ctx, self.record_type.manage_permission())
    }

    /// Owner scope of `ctx` for this record type.
    #[must_use]
    pub fn scope(&self, ctx: &SecurityContext) -> AccessScope {
        ctx.scope(self.policy.clone())
            .manage_permission(self.record_type.manage_permission())
            .resolve()
    }

    /// Apply the ownership rule to a record about to be saved.
    /// Returns true if the owner was changed.
    pub fn assign_owner<R: OwnedRecord>(&self, ctx: &SecurityContext, record: &mut R) -> bool {
        let actor = ctx.subject_id();

        let assign = if self.is_privileged(ctx) {
            record.owner().is_none()
                && match self.assignment {
                    OwnerAssignment::OnCreate => record.id().is_none(),
                    OwnerAssignment::WhenMissing => true,
                }
        } else {
            // No choice for regular subjects, whatever was submitted.
            true
        };

        if assign && record.owner() != Some(actor) {
            record.set_owner(actor);
            return true;
        }
        false
    }

    /// Save a single record.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged if persisting fails.
    #[instrument(skip(self, ctx, store, record), fields(record_type = %self.record_type.record_type(), subject = %ctx.subject_id()))]
    pub async fn save_model<R, S>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        mut record: R,
        is_update: bool,
    ) -> Result<R, StoreError>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
    {
        if self.assign_owner(ctx, &mut record) {
            debug!(is_update, "owner set to acting subject");
        }

        let saved = store.save(ctx.subject_id(), record, is_update).await?;
        info!(record_id = ?saved.id(), is_update, "record saved");
        Ok(saved)
    }

    /// Save a batch of records, applying the single-record rule to each.
    ///
    /// # Errors
    ///
    /// Stops at the first store error and returns it unchanged.
    #[instrument(skip_all, fields(record_type = %self.record_type.record_type(), subject = %ctx.subject_id(), count = items.len()))]
    pub async fn save_formset<R, S>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        items: Vec<R>,
        is_update: bool,
    ) -> Result<Vec<R>, StoreError>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
    {
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            saved.push(self.save_model(ctx, store, item, is_update).await?);
        }
        Ok(saved)
    }

    /// Form fields for `ctx`: the owner field is only offered to privileged subjects.
    #[must_use]
    pub fn get_form(&self, ctx: &SecurityContext) -> FormFields {
        let mut fields = self.record_type.fields().to_vec();
        let mut exclude = Vec::new();

        if self.is_privileged(ctx) {
            fields.push(OWNER_FIELD.to_owned());
        } else {
            exclude.push(OWNER_FIELD.to_owned());
        }

        FormFields { fields, exclude }
    }

    /// Narrow `base` to what `ctx` may see.
    #[must_use]
    pub fn list_view(&self, ctx: &SecurityContext, base: RecordQuery) -> RecordQuery {
        let scope = self.scope(ctx);
        if scope.is_unrestricted() {
            return base;
        }
        base.filter_scope(&scope)
    }

    /// Resolve `object_id` to a record id visible to `ctx`.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged if the existence check fails.
    pub async fn visible_id<R, S>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        object_id: &str,
    ) -> Result<Option<Uuid>, StoreError>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
    {
        let Ok(id) = Uuid::parse_str(object_id) else {
            return Ok(None);
        };

        let query = self.list_view(ctx, RecordQuery::all()).filter_id(id);
        Ok(store.exists(&query).await?.then_some(id))
    }

    /// Run `view` on the record if `ctx` can see it, otherwise redirect to the list page.
    async fn direct_access<R, S, T, E, F, Fut>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        object_id: &str,
        kind: DirectView,
        view: F,
    ) -> Result<Guarded<T>, E>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
        E: From<StoreError>,
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.visible_id(ctx, store, object_id).await? {
            Some(id) => Ok(Guarded::Allowed(view(id).await?)),
            None => {
                debug!(
                    record_type = %self.record_type.record_type(),
                    subject = %ctx.subject_id(),
                    object_id,
                    view = kind.as_str(),
                    "record not visible, redirecting to list"
                );
                Ok(Guarded::Redirect(self.record_type.list_redirect().clone()))
            }
        }
    }

    /// Guard the change (edit) view of `object_id`.
    ///
    /// # Errors
    ///
    /// Returns store errors from the visibility check or errors of `view`.
    pub async fn change_view<R, S, T, E, F, Fut>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        object_id: &str,
        view: F,
    ) -> Result<Guarded<T>, E>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
        E: From<StoreError>,
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.direct_access(ctx, store, object_id, DirectView::Change, view)
            .await
    }

    /// Guard the delete view of `object_id`.
    ///
    /// # Errors
    ///
    /// Returns store errors from the visibility check or errors of `view`.
    pub async fn delete_view<R, S, T, E, F, Fut>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        object_id: &str,
        view: F,
    ) -> Result<Guarded<T>, E>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
        E: From<StoreError>,
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.direct_access(ctx, store, object_id, DirectView::Delete, view)
            .await
    }

    /// Guard the history view of `object_id`.
    ///
    /// # Errors
    ///
    /// Returns store errors from the visibility check or errors of `view`.
    pub async fn history_view<R, S, T, E, F, Fut>(
        &self,
        ctx: &SecurityContext,
        store: &S,
        object_id: &str,
        view: F,
    ) -> Result<Guarded<T>, E>
    where
        R: OwnedRecord,
        S: RecordStore<R> + ?Sized,
        E: From<StoreError>,
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.direct_access(ctx, store, object_id, DirectView::History, view)
            .await
    }
}
