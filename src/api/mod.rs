pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{
    advert_routes, app, category_routes, health_routes, location_routes, user_routes,
};
pub use state::{AppState, SharedState};
