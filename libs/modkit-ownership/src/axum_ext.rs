//! Axum extractors and responses for the ownership guard

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use modkit_security::SecurityContext;

use crate::error::OwnershipError;
use crate::guard::Guarded;
use crate::redirect::Redirect;

/// Extractor for the authenticated `SecurityContext`.
///
/// Rejects requests where the auth middleware inserted no context or an
/// anonymous one.
#[derive(Debug, Clone)]
pub struct Authz(pub SecurityContext);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = OwnershipError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<SecurityContext>() {
            Some(ctx) if !ctx.is_anonymous() => Ok(Authz(ctx.clone())),
            _ => Err(OwnershipError::Unauthenticated),
        }
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.location().to_owned())]).into_response()
    }
}

impl<T: IntoResponse> IntoResponse for Guarded<T> {
    fn into_response(self) -> Response {
        match self {
            Guarded::Allowed(inner) => inner.into_response(),
            Guarded::Redirect(redirect) => redirect.into_response(),
        }
    }
}
