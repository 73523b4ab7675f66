//! Auth route handlers: registration and login.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use saltbox_core::Role;

use crate::error::{ApiError, Result};
use crate::models::CurrentUser;
use crate::routes::ApiJson;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Free-form role field; anything other than a recognized role becomes
    /// a plain customer.
    pub role: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register a new user and return a bearer token.
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let (Some(name), Some(email), Some(password)) = (
        non_empty(request.name),
        non_empty(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "name, email and password are required".into(),
        ));
    };

    let role = Role::parse_or_default(request.role.as_deref());

    let (token, user) = AuthService::new(state.pool())
        .register(&name, &email, &password, role)
        .await?;

    tracing::info!(user_id = %user.id, %role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "user registered successfully",
            "token": token,
            "user": CurrentUser::from(&user),
        })),
    ))
}

/// Login with email and password, returning a fresh bearer token.
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse> {
    let (Some(email), Some(password)) = (
        non_empty(request.email),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::Validation(
            "email and password are required".into(),
        ));
    };

    let (token, user) = AuthService::new(state.pool())
        .login(&email, &password)
        .await?;

    Ok(Json(json!({
        "token": token,
        "user": CurrentUser::from(&user),
    })))
}

/// Trim a text field, treating blank input as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
