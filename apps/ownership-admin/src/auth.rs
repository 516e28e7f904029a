//! Static bearer-token authentication.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use modkit_ownership::OwnershipError;
use modkit_security::SecurityContext;

use crate::config::UserConfig;

/// Token to identity table, built once from configuration.
#[derive(Debug, Default)]
pub struct TokenIdentities {
    by_token: HashMap<String, SecurityContext>,
}

impl TokenIdentities {
    /// # Errors
    ///
    /// Returns an error on an empty or duplicate token, or a nil subject id.
    pub fn from_config(users: &[UserConfig]) -> anyhow::Result<Self> {
        let mut by_token = HashMap::with_capacity(users.len());

        for user in users {
            if user.token.trim().is_empty() {
                bail!("user '{}' has an empty token", user.username);
            }
            if user.subject_id.is_nil() {
                bail!("user '{}' has a nil subject_id", user.username);
            }

            let ctx = SecurityContext::builder()
                .subject_id(user.subject_id)
                .username(&user.username)
                .superuser(user.is_superuser)
                .permissions(user.permissions.iter().cloned())
                .build();

            if by_token.insert(user.token.clone(), ctx).is_some() {
                bail!("token of user '{}' is already assigned", user.username);
            }
        }

        Ok(Self { by_token })
    }

    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<SecurityContext> {
        self.by_token.get(token).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

/// Resolve the bearer token to a `SecurityContext` and insert it into the
/// request extensions. Missing or unknown tokens are rejected with 401.
pub async fn authenticate(
    State(identities): State<Arc<TokenIdentities>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(ctx) = extract_bearer_token(request.headers()).and_then(|t| identities.resolve(t))
    else {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected request without a valid bearer token"
        );
        return OwnershipError::Unauthenticated.into_response();
    };

    tracing::debug!(subject = %ctx.subject_id(), username = ?ctx.username(), "authenticated");
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").map(str::trim))
}
