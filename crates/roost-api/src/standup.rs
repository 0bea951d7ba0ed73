use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use roost_types::api::{
    StandupActiveResponse, StandupSendRequest, StandupStartRequest, StandupStartResponse,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::BearerToken;

pub async fn start(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<StandupStartRequest>,
) -> ApiResult<Json<StandupStartResponse>> {
    let time_finish = store.standup_start(&token, channel_id, req.length)?;
    Ok(Json(StandupStartResponse { time_finish }))
}

pub async fn send(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<StandupSendRequest>,
) -> ApiResult<Json<Value>> {
    store.standup_send(&token, channel_id, &req.message)?;
    Ok(Json(json!({})))
}

pub async fn active(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
) -> ApiResult<Json<StandupActiveResponse>> {
    Ok(Json(store.standup_active(&token, channel_id)?))
}
