//! HTTP API assembly.
//!
//! [`create_router`] builds the full axum router used by `main.rs` and by
//! the integration tests.

pub mod health;
pub mod journal;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::metrics::AppMetrics;
use crate::service::JournalService;

/// State shared by every handler.
pub struct AppState {
    pub service: JournalService,
    pub metrics: Arc<AppMetrics>,
}

pub type ApiState = Arc<AppState>;

pub fn create_router(state: ApiState) -> Router {
    let journal_routes = Router::new()
        .route("/journal", get(journal::list_entries).post(journal::create_entry))
        .route("/journal/stats", get(journal::journal_stats))
        .route("/journal/recent/:limit", get(journal::recent_entries))
        .route(
            "/journal/:id",
            get(journal::get_entry)
                .put(journal::update_entry)
                .delete(journal::delete_entry),
        )
        .route("/journal/:id/analyze", post(journal::analyze_entry));

    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(render_metrics))
        .nest("/api", journal_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), track_http_metrics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// `GET /metrics` - Prometheus text exposition.
async fn render_metrics(State(state): State<ApiState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to render metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics error").into_response()
        }
    }
}

/// Records request count and latency, labelled by the matched route.
async fn track_http_metrics(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();

    state
        .metrics
        .http_requests_total
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();
    state.metrics.http_request_duration.observe(elapsed);
    tracing::debug!("{} {} -> {} ({:.3}s)", method, path, response.status(), elapsed);

    response
}
