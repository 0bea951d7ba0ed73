use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use roost_types::api::{
    PermissionChangeRequest, ProfileResponse, SetEmailRequest, SetHandleRequest, SetNameRequest,
    UsersResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::BearerToken;

pub async fn profile(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(u_id): Path<u64>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = store.user_profile(&token, u_id)?;
    Ok(Json(ProfileResponse { user }))
}

pub async fn all(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<UsersResponse>> {
    let users = store.users_all(&token)?;
    Ok(Json(UsersResponse { users }))
}

pub async fn set_name(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetNameRequest>,
) -> ApiResult<Json<Value>> {
    store.user_set_name(&token, &req.name_first, &req.name_last)?;
    Ok(Json(json!({})))
}

pub async fn set_email(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetEmailRequest>,
) -> ApiResult<Json<Value>> {
    store.user_set_email(&token, &req.email)?;
    Ok(Json(json!({})))
}

pub async fn set_handle(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<SetHandleRequest>,
) -> ApiResult<Json<Value>> {
    store.user_set_handle(&token, &req.handle_str)?;
    Ok(Json(json!({})))
}

pub async fn permission_change(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<PermissionChangeRequest>,
) -> ApiResult<Json<Value>> {
    store.admin_permission_change(&token, req.u_id, req.permission_id)?;
    Ok(Json(json!({})))
}
