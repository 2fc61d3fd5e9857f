//! # REST API for the Dashboard Overview

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use log::info;

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for dashboard related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/summary", get(get_summary))
        .route("/alerts", get(get_alerts))
}

/// Financial summary plus every alert list
pub async fn get_dashboard(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard");

    match state.dashboard_service.dashboard().await {
        Ok(dashboard) => (StatusCode::OK, Json(dashboard)).into_response(),
        Err(e) => error_response("Failed to build dashboard", e),
    }
}

pub async fn get_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard/summary");

    match state.dashboard_service.summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response("Failed to build financial summary", e),
    }
}

pub async fn get_alerts(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard/alerts");

    let today = Utc::now().date_naive();
    match state.dashboard_service.alerts(today).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(e) => error_response("Failed to build alerts", e),
    }
}
