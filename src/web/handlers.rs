// file: src/web/handlers.rs
// description: request handlers for the results page and health report
// reference: https://docs.rs/axum/latest/axum/extract/index.html

use crate::service::SearchService;
use crate::utils::{HealthCheck, HealthReport, HealthStatus, Validator};
use crate::web::render::render_page;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

/// GET / - search form, results, summary and errors
pub async fn show_main(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<SearchParams>,
) -> Html<String> {
    let query = Validator::normalize_query(params.query.as_deref()).unwrap_or_default();
    let page = service.run(&query).await;
    Html(render_page(&page))
}

/// GET /health - backend reachability and summarizer availability
pub async fn health(State(service): State<Arc<SearchService>>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let backend_check = if service.backend().ping().await {
        HealthCheck::healthy("search_backend", started.elapsed())
    } else {
        HealthCheck::unhealthy(
            "search_backend",
            format!("{} is unreachable", service.backend().endpoint()),
            started.elapsed(),
        )
    };

    let summarizer_check = if service.summarizer().is_enabled() {
        HealthCheck::healthy("summarizer", Duration::ZERO)
    } else {
        HealthCheck::degraded("summarizer", "API key missing".to_string(), Duration::ZERO)
    };

    let report = HealthReport::new(
        vec![backend_check, summarizer_check],
        env!("CARGO_PKG_VERSION").to_string(),
    );

    let status = match report.overall_status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(report))
}
