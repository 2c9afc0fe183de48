// file: src/web/routing.rs
// description: axum router for the search surface
// reference: https://docs.rs/axum/latest/axum/struct.Router.html

use crate::service::SearchService;
use crate::web::handlers;
use axum::{Router, routing::get};
use std::sync::Arc;

pub fn create_router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/", get(handlers::show_main))
        .route("/health", get(handlers::health))
        .with_state(service)
}
