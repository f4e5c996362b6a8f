pub mod error;
pub mod geo;
pub mod handlers;
pub mod models;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::store::SpotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SpotStore>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/users/uid/:uid", get(handlers::get_user_by_uid))
        .route("/api/users", post(handlers::create_user))
        .route("/api/parking-spots", get(handlers::list_spots))
        .route("/api/parking-spots/search", get(handlers::search_spots))
        .route("/api/parking-spots/:id", get(handlers::get_spot))
        .route(
            "/api/favorites/:id",
            get(handlers::list_favorites).delete(handlers::remove_favorite),
        )
        .route("/api/favorites", post(handlers::add_favorite))
        .layer(cors)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

/// A panic inside a handler becomes a logged, generic 500.
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    error::internal_error(detail).into_response()
}
