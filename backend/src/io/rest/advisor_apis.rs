//! # REST API for the AI Advisor

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use log::info;
use shared::AdvisorRequest;

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for advisor related APIs
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(ask_advisor))
}

/// Ask the advisor; an unreachable advisor still answers 200 with the fallback text
pub async fn ask_advisor(
    State(state): State<AppState>,
    Json(request): Json<AdvisorRequest>,
) -> impl IntoResponse {
    info!("POST /api/advisor - {} characters", request.prompt.len());

    match state.advisor_service.ask(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("Advisor request rejected", e),
    }
}
