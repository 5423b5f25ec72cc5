use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::state::SharedState;
use crate::error::{ApiError, Result};
use crate::extractors::ApiJson;
use crate::models::{AdvertImage, AdvertPatch, AdvertView, NewAdvert};
use crate::search::{AdvertQuery, Paginated};

const IMAGE_FIELD: &str = "image";

/// List adverts with filters, ordering and pagination
pub async fn list_adverts(
    State(state): State<SharedState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Paginated<AdvertView>>> {
    let query = AdvertQuery::from_params(&params)?;
    let page = state.adverts.list(&query, state.page_size).await?;
    Ok(Json(page.map(|advert| advert.into_view(&state.media))))
}

pub async fn read_advert(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<AdvertView>> {
    let advert = state.adverts.read(id).await?;
    Ok(Json(advert.into_view(&state.media)))
}

pub async fn create_advert(
    State(state): State<SharedState>,
    ApiJson(input): ApiJson<NewAdvert>,
) -> Result<(StatusCode, Json<AdvertView>)> {
    let advert = state.adverts.create(input).await?;
    Ok((StatusCode::CREATED, Json(advert.into_view(&state.media))))
}

pub async fn update_advert(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    ApiJson(patch): ApiJson<AdvertPatch>,
) -> Result<Json<AdvertView>> {
    let advert = state.adverts.update(id, patch).await?;
    Ok(Json(advert.into_view(&state.media)))
}

pub async fn delete_advert(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    if let Some(image) = state.adverts.delete(id).await? {
        state.media.remove(&image).await;
    }
    Ok(Json(json!({ "status": "ok" })))
}

/// Store the multipart `image` field and attach it to the advert
pub async fn upload_advert_image(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<AdvertImage>> {
    // 404 before anything touches storage
    state.adverts.read(id).await?;

    let mut stored = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        stored = Some(
            state
                .media
                .save_image(file_name.as_deref(), content_type.as_deref(), &bytes)
                .await?,
        );
        break;
    }

    let path = stored.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart file field '{}'", IMAGE_FIELD))
    })?;

    match state.adverts.set_image(id, &path).await {
        Ok((advert, previous)) => {
            if let Some(previous) = previous.filter(|p| *p != path) {
                state.media.remove(&previous).await;
            }
            Ok(Json(AdvertImage {
                id: advert.id,
                name: advert.name,
                image: advert.image.as_deref().map(|p| state.media.url(p)),
            }))
        }
        Err(e) => {
            state.media.remove(&path).await;
            Err(e)
        }
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}
