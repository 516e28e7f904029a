use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use modkit_ownership::axum_ext::Authz;
use modkit_ownership::{
    FormFields, Guarded, OwnershipError, RecordQuery, RecordStore, RegisteredType, StoreError,
};
use modkit_security::OWNER_FIELD;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::dto::{
    BulkCreateRequest, FormDto, HistoryDto, RecordDto, RecordForm, RecordListDto, RecordTypeDto,
};
use crate::domain::record::AdminRecord;
use crate::domain::site::AdminSite;

type ApiResult<T> = Result<T, OwnershipError>;

/// Copy the submitted values the form offers onto `record`; anything else is dropped.
///
/// A null `owner` leaves the current owner in place: an owner is never cleared.
fn apply_form(form: &FormFields, input: RecordForm, record: &mut AdminRecord) -> ApiResult<()> {
    for (field, value) in input {
        if !form.permits(&field) {
            debug!(field = %field, "dropping field not offered by the form");
            continue;
        }

        if field == OWNER_FIELD {
            if let Some(owner) = parse_owner(&value)? {
                record.owner = Some(owner);
            }
        } else {
            record.data.insert(field, value);
        }
    }
    Ok(())
}

fn parse_owner(value: &Value) -> ApiResult<Option<Uuid>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Uuid::parse_str(s)
            .map(Some)
            .map_err(|e| OwnershipError::BadRequest(format!("invalid owner '{s}': {e}"))),
        other => Err(OwnershipError::BadRequest(format!(
            "owner must be a UUID string, got {other}"
        ))),
    }
}

/// Turn a record that vanished after the visibility check into the list redirect.
fn redirect_if_gone<T>(
    record_type: &RegisteredType,
    outcome: ApiResult<Guarded<T>>,
) -> ApiResult<Guarded<T>> {
    match outcome {
        Err(OwnershipError::Store(StoreError::NotFound(id))) => {
            debug!(record_id = %id, "record disappeared, redirecting to list");
            Ok(Guarded::Redirect(record_type.list_redirect().clone()))
        }
        other => other,
    }
}

pub async fn index(
    Authz(_ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
) -> Json<Vec<RecordTypeDto>> {
    Json(
        site.registry()
            .iter()
            .map(|registered| RecordTypeDto::from(&**registered))
            .collect(),
    )
}

pub async fn list_records(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
) -> ApiResult<Json<RecordListDto>> {
    let admin = site.model_admin(&app, &model)?;

    let query = admin.guard().list_view(&ctx, RecordQuery::all());
    let records = admin.store().fetch(&query).await?;

    Ok(Json(RecordListDto {
        record_type: admin.guard().record_type().record_type().to_string(),
        records: records.into_iter().map(RecordDto::from).collect(),
    }))
}

pub async fn add_form(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
) -> ApiResult<Json<FormDto>> {
    let admin = site.model_admin(&app, &model)?;
    let form = admin.guard().get_form(&ctx);
    Ok(Json(FormDto::new(admin.guard().record_type(), &form, None)))
}

pub async fn create_record(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
    Json(input): Json<RecordForm>,
) -> ApiResult<impl IntoResponse> {
    let admin = site.model_admin(&app, &model)?;
    let form = admin.guard().get_form(&ctx);

    let mut record = AdminRecord::default();
    apply_form(&form, input, &mut record)?;

    let saved = admin
        .guard()
        .save_model(&ctx, admin.store(), record, false)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordDto::from(saved))))
}

pub async fn bulk_create(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model)): Path<(String, String)>,
    Json(req): Json<BulkCreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let admin = site.model_admin(&app, &model)?;
    let form = admin.guard().get_form(&ctx);

    let mut items = Vec::with_capacity(req.items.len());
    for input in req.items {
        let mut record = AdminRecord::default();
        apply_form(&form, input, &mut record)?;
        items.push(record);
    }

    let saved = admin
        .guard()
        .save_formset(&ctx, admin.store(), items, false)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(saved.into_iter().map(RecordDto::from).collect::<Vec<_>>()),
    ))
}

pub async fn change_form(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model, object_id)): Path<(String, String, String)>,
) -> ApiResult<Guarded<Json<FormDto>>> {
    let admin = site.model_admin(&app, &model)?;
    let form = admin.guard().get_form(&ctx);

    let outcome = admin
        .guard()
        .change_view(&ctx, admin.store(), &object_id, |id| async move {
            let record = admin.store().get(id).await?.ok_or(StoreError::NotFound(id))?;
            Ok::<_, OwnershipError>(Json(FormDto::new(
                admin.guard().record_type(),
                &form,
                Some(record),
            )))
        })
        .await;
    redirect_if_gone(admin.guard().record_type(), outcome)
}

pub async fn change_record(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model, object_id)): Path<(String, String, String)>,
    Json(input): Json<RecordForm>,
) -> ApiResult<Guarded<Json<RecordDto>>> {
    let admin = site.model_admin(&app, &model)?;
    let form = admin.guard().get_form(&ctx);
    let ctx = &ctx;

    let outcome = admin
        .guard()
        .change_view(ctx, admin.store(), &object_id, |id| async move {
            let mut record = admin.store().get(id).await?.ok_or(StoreError::NotFound(id))?;
            apply_form(&form, input, &mut record)?;

            let saved = admin
                .guard()
                .save_model(ctx, admin.store(), record, true)
                .await?;
            Ok::<_, OwnershipError>(Json(RecordDto::from(saved)))
        })
        .await;
    redirect_if_gone(admin.guard().record_type(), outcome)
}

pub async fn delete_record(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model, object_id)): Path<(String, String, String)>,
) -> ApiResult<Guarded<StatusCode>> {
    let admin = site.model_admin(&app, &model)?;
    let actor = ctx.subject_id();

    let outcome = admin
        .guard()
        .delete_view(&ctx, admin.store(), &object_id, |id| async move {
            if !admin.store().delete(actor, id).await? {
                return Err(OwnershipError::from(StoreError::NotFound(id)));
            }
            info!(record_id = %id, subject = %actor, "record deleted");
            Ok::<_, OwnershipError>(StatusCode::NO_CONTENT)
        })
        .await;
    redirect_if_gone(admin.guard().record_type(), outcome)
}

pub async fn record_history(
    Authz(ctx): Authz,
    Extension(site): Extension<Arc<AdminSite>>,
    Path((app, model, object_id)): Path<(String, String, String)>,
) -> ApiResult<Guarded<Json<HistoryDto>>> {
    let admin = site.model_admin(&app, &model)?;

    admin
        .guard()
        .history_view(&ctx, admin.store(), &object_id, |id| async move {
            let entries = admin.store().history(id).await?;
            Ok::<_, OwnershipError>(Json(HistoryDto {
                record_id: id,
                entries,
            }))
        })
        .await
}
