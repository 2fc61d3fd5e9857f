//! # REST API for Assets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use log::info;
use shared::{CreateAssetRequest, RecordMaintenanceRequest, UpdateAssetRequest};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for asset related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_assets).post(create_asset))
        .route("/maintenance-due", get(maintenance_due))
        .route("/:id", get(get_asset).put(update_asset).delete(delete_asset))
        .route("/:id/maintenance", post(record_maintenance))
}

pub async fn list_assets(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/assets");

    match state.asset_service.list_assets().await {
        Ok(assets) => (StatusCode::OK, Json(assets)).into_response(),
        Err(e) => error_response("Failed to list assets", e),
    }
}

pub async fn create_asset(
    State(state): State<AppState>,
    Json(request): Json<CreateAssetRequest>,
) -> impl IntoResponse {
    info!("POST /api/assets - request: {:?}", request);

    match state.asset_service.create_asset(request).await {
        Ok(asset) => (StatusCode::CREATED, Json(asset)).into_response(),
        Err(e) => error_response("Failed to create asset", e),
    }
}

pub async fn get_asset(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/assets/{}", id);

    match state.asset_service.get_asset(&id).await {
        Ok(asset) => (StatusCode::OK, Json(asset)).into_response(),
        Err(e) => error_response("Failed to get asset", e),
    }
}

pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAssetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/assets/{} - request: {:?}", id, request);

    match state.asset_service.update_asset(&id, request).await {
        Ok(asset) => (StatusCode::OK, Json(asset)).into_response(),
        Err(e) => error_response("Failed to update asset", e),
    }
}

pub async fn delete_asset(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/assets/{}", id);

    match state.asset_service.delete_asset(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete asset", e),
    }
}

pub async fn record_maintenance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordMaintenanceRequest>,
) -> impl IntoResponse {
    info!("POST /api/assets/{}/maintenance - request: {:?}", id, request);

    match state.asset_service.record_maintenance(&id, request).await {
        Ok(asset) => (StatusCode::OK, Json(asset)).into_response(),
        Err(e) => error_response("Failed to record maintenance", e),
    }
}

/// Assets due for service under the configured interval
pub async fn maintenance_due(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/assets/maintenance-due");

    let today = Utc::now().date_naive();
    let interval = state.config.asset_maintenance_interval_days;
    match state.asset_service.maintenance_due(today, interval).await {
        Ok(assets) => (StatusCode::OK, Json(assets)).into_response(),
        Err(e) => error_response("Failed to list assets due for maintenance", e),
    }
}
