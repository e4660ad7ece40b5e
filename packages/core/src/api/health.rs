use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::ApiState;

/// `GET /health` - liveness plus the configured analysis provider.
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static("no-store"))],
        Json(json!({
            "status": "ok",
            "analysisProvider": state.service.provider_name(),
        })),
    )
}
