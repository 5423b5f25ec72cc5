use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::api::state::SharedState;

/// Root endpoint
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Health check endpoint - checks database connectivity
pub async fn health_check(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => {
            tracing::debug!("Health check passed - database connection OK");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "healthy",
                    "database": "connected",
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
        Err(e) => {
            tracing::error!("Health check failed - database error: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "error": "Database connection failed"
                })),
            )
        }
    }
}

/// Readiness check - the database must answer and the media root must exist
pub async fn readiness_check(State(state): State<SharedState>) -> (StatusCode, Json<Value>) {
    let database = sqlx::query("SELECT 1").fetch_one(&state.pool).await;
    let media = tokio::fs::create_dir_all(state.media.root()).await;

    match (database, media) {
        (Ok(_), Ok(())) => {
            tracing::debug!("Readiness check passed");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ready",
                    "database": "connected",
                    "media": "writable"
                })),
            )
        }
        (database, media) => {
            if let Err(e) = &database {
                tracing::warn!("Readiness check failed on database: {}", e);
            }
            if let Err(e) = &media {
                tracing::warn!("Readiness check failed on media root: {}", e);
            }
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not ready",
                    "database": if database.is_ok() { "connected" } else { "disconnected" },
                    "media": if media.is_ok() { "writable" } else { "unavailable" }
                })),
            )
        }
    }
}

/// Liveness check endpoint - indicates if server process is alive
pub async fn liveness_check() -> (StatusCode, Json<Value>) {
    tracing::debug!("Liveness check passed");
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}
