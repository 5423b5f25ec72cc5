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
use crate::models::{Category, CategoryInput};
use crate::search::{page_param, Paginated};

pub async fn list_categories(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<Category>>> {
    let page = state
        .categories
        .list(page_param(&params), state.page_size)
        .await?;
    Ok(Json(page))
}

pub async fn read_category(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>> {
    Ok(Json(state.categories.read(id).await?))
}

pub async fn create_category(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state.categories.create(&input.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<CategoryInput>,
) -> Result<Json<Category>> {
    Ok(Json(state.categories.update(id, &input.name).await?))
}

pub async fn delete_category(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.categories.delete(id).await?;
    Ok(Json(json!({ "status": "ok" })))
}
