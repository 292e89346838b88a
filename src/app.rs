use axum::Router;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::routes::{health, stocks};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest(stocks::MOUNT_PATH, stocks::router())
        .route(&format!("{}/", stocks::MOUNT_PATH), stocks::list_route())
        .fallback(|| async { AppError::NotFound })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
