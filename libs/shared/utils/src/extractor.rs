use axum::{
    body::Body,
    extract::{FromRequest, State},
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use tracing::{debug, warn};

use shared_database::{Collection, Document, Filter};
use shared_models::auth::{AuthUser, ADMIN_ROLE};
use shared_models::error::{AppError, REQUEST_FORBIDDEN};

use crate::jwt::validate_token;
use crate::state::AppState;

/// `Json` body extractor whose rejections are 400 `{message}` responses.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Authenticated gate. A missing header is 401; anything present but unusable is 403.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::unauthorized)?;

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(AppError::forbidden)?;

    let user = validate_token(token, &state.config.access_token_secret).map_err(|e| {
        debug!("Rejecting bearer token: {}", e);
        AppError::forbidden()
    })?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Admin gate. Must be layered inside `auth_middleware`.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = extract_user(&request)?;

    let account = state
        .store
        .find_one(Collection::Users, &Filter::new().eq("email", user.email.clone()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !account.as_ref().is_some_and(has_admin_role) {
        warn!("Admin access denied for {}", user.email);
        return Err(AppError::Forbidden(REQUEST_FORBIDDEN.to_string()));
    }

    Ok(next.run(request).await)
}

pub fn extract_user<B>(request: &Request<B>) -> Result<AuthUser, AppError> {
    request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(AppError::unauthorized)
}

pub fn has_admin_role(account: &Document) -> bool {
    account.get("role").and_then(Value::as_str) == Some(ADMIN_ROLE)
}
