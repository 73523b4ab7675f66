//! Authentication extractors for route handlers.
//!
//! The auth gate is a bearer token in the `Authorization` header. Extractors
//! resolve it to a `{subject id, role}` pair and enforce capabilities:
//! a missing or unverifiable token rejects with 401, a resolved actor whose
//! role lacks the required capability rejects with 403.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use saltbox_core::Capability;

use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Extractor that requires an authenticated actor with the
/// [`Capability::ManageCatalog`] capability.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.name)
/// }
/// ```
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor = authenticate(&parts.headers, state).await?;

        if !actor.role.can(Capability::ManageCatalog) {
            return Err(ApiError::Forbidden("forbidden: insufficient role".into()));
        }

        Ok(Self(actor))
    }
}

/// Resolve the request's bearer token to an actor.
async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<CurrentUser, ApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("authorization header missing".into()))?;

    AuthService::new(state.pool())
        .authenticate_bearer(token)
        .await
        .map_err(|e| match e {
            AuthError::InvalidToken => ApiError::Unauthorized("invalid or expired token".into()),
            other => ApiError::Auth(other),
        })
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
