use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use roost_types::api::{
    EditMessageRequest, MessageIdResponse, ReactRequest, SearchResponse, SendLaterRequest,
    SendMessageRequest,
};

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::BearerToken;

pub async fn send(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let message_id = store.message_send(&token, channel_id, &req.message)?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn send_later(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(channel_id): Path<u64>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<Json<MessageIdResponse>> {
    let message_id = store.message_send_later(&token, channel_id, &req.message, req.time_sent)?;
    Ok(Json(MessageIdResponse { message_id }))
}

pub async fn edit(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<Json<Value>> {
    store.message_edit(&token, message_id, &req.message)?;
    Ok(Json(json!({})))
}

pub async fn remove(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    store.message_remove(&token, message_id)?;
    Ok(Json(json!({})))
}

pub async fn react(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Value>> {
    store.message_react(&token, message_id, req.react_id)?;
    Ok(Json(json!({})))
}

pub async fn unreact(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<Json<Value>> {
    store.message_unreact(&token, message_id, req.react_id)?;
    Ok(Json(json!({})))
}

pub async fn pin(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    store.message_pin(&token, message_id)?;
    Ok(Json(json!({})))
}

pub async fn unpin(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Path(message_id): Path<u64>,
) -> ApiResult<Json<Value>> {
    store.message_unpin(&token, message_id)?;
    Ok(Json(json!({})))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query_str: String,
}

pub async fn search(
    State(store): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let messages = store.search(&token, &query.query_str)?;
    Ok(Json(SearchResponse { messages }))
}
