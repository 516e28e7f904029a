use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router, middleware};

use super::handlers;
use crate::auth::{self, TokenIdentities};
use crate::domain::site::AdminSite;

/// Admin routes, mounted under the site's prefix and behind token auth.
#[must_use]
pub fn router(site: Arc<AdminSite>, identities: Arc<TokenIdentities>) -> Router {
    let prefix = site.admin_prefix().to_owned();
    let model = format!("{prefix}/{{app}}/{{model}}");
    let object = format!("{model}/{{object_id}}");

    Router::new()
        .route(&format!("{prefix}/"), get(handlers::index))
        .route(&format!("{model}/"), get(handlers::list_records))
        .route(
            &format!("{model}/add/"),
            get(handlers::add_form).post(handlers::create_record),
        )
        .route(&format!("{model}/bulk/"), post(handlers::bulk_create))
        .route(
            &format!("{object}/change/"),
            get(handlers::change_form).post(handlers::change_record),
        )
        .route(&format!("{object}/delete/"), post(handlers::delete_record))
        .route(&format!("{object}/history/"), get(handlers::record_history))
        .layer(Extension(site))
        .layer(middleware::from_fn_with_state(identities, auth::authenticate))
}
