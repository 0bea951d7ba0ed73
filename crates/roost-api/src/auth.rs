use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};
use tracing::info;

use roost_types::api::{
    AuthResponse, LoginRequest, LogoutResponse, PasswordResetRequest, PasswordResetSubmit,
    RegisterRequest,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::BearerToken;

pub async fn register(
    State(store): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (u_id, token) = store.register(&req.email, &req.password, &req.name_first, &req.name_last)?;
    Ok(Json(AuthResponse { u_id, token }))
}

pub async fn login(
    State(store): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let (u_id, token) = store.login(&req.email, &req.password)?;
    Ok(Json(AuthResponse { u_id, token }))
}

pub async fn logout(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<LogoutResponse>> {
    let is_success = store.logout(&token)?;
    Ok(Json(LogoutResponse { is_success }))
}

/// Issue a reset code for the account. The code goes out through an
/// external mailer, never through this response.
pub async fn password_reset_request(
    State(store): State<AppState>,
    Json(req): Json<PasswordResetRequest>,
) -> ApiResult<Json<Value>> {
    store.password_reset_request(&req.email)?;
    info!("password reset code issued");
    Ok(Json(json!({})))
}

pub async fn password_reset(
    State(store): State<AppState>,
    Json(req): Json<PasswordResetSubmit>,
) -> ApiResult<Json<Value>> {
    store.password_reset(&req.reset_code, &req.new_password)?;
    Ok(Json(json!({})))
}

/// Reset the whole store to its initial empty state. Exposed for test
/// isolation only.
pub async fn clear(State(store): State<AppState>) -> Json<Value> {
    store.clear();
    Json(json!({}))
}
