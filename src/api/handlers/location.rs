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
use crate::models::{Location, LocationPatch, NewLocation};
use crate::search::{page_param, Paginated};

pub async fn list_locations(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<Location>>> {
    let page = state
        .locations
        .list(page_param(&params), state.page_size)
        .await?;
    Ok(Json(page))
}

pub async fn read_location(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Location>> {
    Ok(Json(state.locations.read(id).await?))
}

pub async fn create_location(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<NewLocation>,
) -> Result<(StatusCode, Json<Location>)> {
    let location = state.locations.create(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update_location(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<LocationPatch>,
) -> Result<Json<Location>> {
    Ok(Json(state.locations.update(id, patch).await?))
}

/// Users pointing at the location are detached, not deleted
pub async fn delete_location(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.locations.delete(id).await?;
    Ok(Json(json!({ "status": "ok" })))
}
