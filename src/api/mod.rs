use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::search_client::SearchClient;

pub mod handlers;
pub mod models;

pub fn create_router(search_client: Arc<SearchClient>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handlers::search_handler))
        .with_state(search_client)
        .layer(cors)
}
