//! # REST API for Data Import/Export
//!
//! CSV import/export of inventory, payroll CSV export and full JSON backups.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::{CsvImportRequest, RestoreBackupRequest};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for import/export related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(export_inventory).post(import_inventory))
        .route("/payroll", get(export_payroll))
        .route("/backup", get(export_backup).post(restore_backup))
}

pub async fn import_inventory(
    State(state): State<AppState>,
    Json(request): Json<CsvImportRequest>,
) -> impl IntoResponse {
    info!("POST /api/data/inventory - {} bytes", request.content.len());

    match state.export_service.import_inventory_csv(&request.content).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response("Failed to import inventory", e),
    }
}

pub async fn export_inventory(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/data/inventory");

    match state.export_service.export_inventory_csv().await {
        Ok(csv) => (StatusCode::OK, Json(csv)).into_response(),
        Err(e) => error_response("Failed to export inventory", e),
    }
}

pub async fn export_payroll(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/data/payroll");

    match state.export_service.export_payroll_csv().await {
        Ok(csv) => (StatusCode::OK, Json(csv)).into_response(),
        Err(e) => error_response("Failed to export payroll", e),
    }
}

pub async fn export_backup(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/data/backup");

    match state.export_service.export_backup().await {
        Ok(backup) => (StatusCode::OK, Json(backup)).into_response(),
        Err(e) => error_response("Failed to export backup", e),
    }
}

/// Replace collections from a backup document
pub async fn restore_backup(
    State(state): State<AppState>,
    Json(request): Json<RestoreBackupRequest>,
) -> impl IntoResponse {
    info!("POST /api/data/backup - {} bytes", request.content.len());

    match state.export_service.restore_backup(&request.content).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response("Failed to restore backup", e),
    }
}
