use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use roost_types::api::{
    ChannelDetails, ChannelsResponse, CreateChannelRequest, CreateChannelResponse, MessagesPage,
    TargetUserRequest,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::BearerToken;

pub async fn create(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<Json<CreateChannelResponse>> {
    let channel_id = store.channels_create(&token, &req.name, req.is_public)?;
    Ok(Json(CreateChannelResponse { channel_id }))
}

pub async fn list_mine(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ChannelsResponse>> {
    let channels = store.channels_list(&token)?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn list_all(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<ChannelsResponse>> {
    let channels = store.channels_listall(&token)?;
    Ok(Json(ChannelsResponse { channels }))
}

pub async fn details(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
) -> ApiResult<Json<ChannelDetails>> {
    Ok(Json(store.channel_details(&token, channel_id)?))
}

pub async fn join(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    store.channel_join(&token, channel_id)?;
    Ok(Json(json!({})))
}

pub async fn invite(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    store.channel_invite(&token, channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn leave(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    store.channel_leave(&token, channel_id)?;
    Ok(Json(json!({})))
}

pub async fn add_owner(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    store.channel_addowner(&token, channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn remove_owner(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    store.channel_removeowner(&token, channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

pub async fn remove_member(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<TargetUserRequest>,
) -> ApiResult<Json<Value>> {
    store.channel_removemember(&token, channel_id, req.u_id)?;
    Ok(Json(json!({})))
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub start: usize,
}

pub async fn messages(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<MessagesPage>> {
    Ok(Json(store.channel_messages(&token, channel_id, query.start)?))
}
