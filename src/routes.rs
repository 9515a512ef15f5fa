use crate::{
    AppState, // Use the AppState defined in main.rs
    handlers, // Import handlers module
};
use axum::{Router, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Creates the Axum router and associates trigger routes with handlers.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/fetch", post(handlers::fetch_trending))
        .route("/thumbnails", post(handlers::process_created_objects))
        .layer(TraceLayer::new_for_http())
        .with_state(state) // Pass the application state
}
