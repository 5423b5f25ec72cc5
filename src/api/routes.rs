use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::advert::{
    create_advert, delete_advert, list_adverts, read_advert, update_advert, upload_advert_image,
};
use super::handlers::category::{
    create_category, delete_category, list_categories, read_category, update_category,
};
use super::handlers::health::{health_check, liveness_check, readiness_check, root};
use super::handlers::location::{
    create_location, delete_location, list_locations, read_location, update_location,
};
use super::handlers::user::{create_user, delete_user, list_users, read_user, update_user};
use super::state::SharedState;
use crate::middleware::{LoggingLayer, RequestIdLayer};

pub fn advert_routes(state: SharedState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/ads", get(list_adverts).post(create_advert))
        .route("/ads/:id", get(read_advert).patch(update_advert).delete(delete_advert))
        .route(
            "/ads/:id/image",
            post(upload_advert_image)
                .patch(upload_advert_image)
                .layer(upload_limit),
        )
        .with_state(state)
}

pub fn category_routes(state: SharedState) -> Router {
    Router::new()
        .route("/cat", get(list_categories).post(create_category))
        .route("/cat/:id", get(read_category).patch(update_category).delete(delete_category))
        .with_state(state)
}

pub fn user_routes(state: SharedState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(read_user).patch(update_user).delete(delete_user))
        .with_state(state)
}

pub fn location_routes(state: SharedState) -> Router {
    Router::new()
        .route("/loc", get(list_locations).post(create_location))
        .route("/loc/:id", get(read_location).patch(update_location).delete(delete_location))
        .with_state(state)
}

pub fn health_routes(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .with_state(state)
}

/// The whole application: every resource router plus the shared middleware
/// stack. The request id layer is outermost so the logging layer sees it.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .merge(health_routes(state.clone()))
        .merge(advert_routes(state.clone()))
        .merge(category_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(location_routes(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(LoggingLayer)
        .layer(RequestIdLayer)
}
