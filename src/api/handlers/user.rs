use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::state::SharedState;
use crate::error::Result;
use crate::extractors::ApiJson;
use crate::models::{NewUser, User, UserPatch};
use crate::search::{page_param, Paginated};

/// List users by username, each with its published advert count
pub async fn list_users(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<User>>> {
    let page = state.users.list(page_param(&params), state.page_size).await?;
    Ok(Json(page))
}

pub async fn read_user(State(state): State<SharedState>, Path(id): Path<i64>) -> Result<Json<User>> {
    Ok(Json(state.users.read(id).await?))
}

pub async fn create_user(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<UserPatch>,
) -> Result<Json<User>> {
    Ok(Json(state.users.update(id, patch).await?))
}

/// Delete a user; its adverts go with it
pub async fn delete_user(State(state): State<SharedState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    let images = state.users.delete(id).await?;
    state.media.remove_all(&images).await;
    Ok(Json(json!({ "status": "ok" })))
}
