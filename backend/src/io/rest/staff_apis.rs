//! # REST API for Staff
//!
//! Staff records, clock in/out, payroll and sign-in.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use log::info;
use shared::{
    AddStaffDocumentRequest, ClockRequest, CreateStaffRequest, LoginRequest,
    RecomputeTotalsRequest, UpdateStaffRequest,
};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for staff related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/login", post(login))
        .route("/payroll", get(payroll_summary))
        .route("/reset-totals", post(reset_monthly_totals))
        .route("/:id", get(get_staff).put(update_staff).delete(delete_staff))
        .route("/:id/clock", post(clock))
        .route("/:id/recompute", post(recompute_totals))
        .route("/:id/documents", post(add_document))
        .route("/:id/documents/:document_id", delete(remove_document))
}

pub async fn list_staff(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/staff");

    match state.staff_service.list_staff().await {
        Ok(staff) => (StatusCode::OK, Json(staff)).into_response(),
        Err(e) => error_response("Failed to list staff", e),
    }
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(request): Json<CreateStaffRequest>,
) -> impl IntoResponse {
    info!("POST /api/staff - username: {}", request.username);

    match state.staff_service.create_staff(request).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => error_response("Failed to create staff member", e),
    }
}

pub async fn get_staff(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/staff/{}", id);

    match state.staff_service.get_staff(&id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Failed to get staff member", e),
    }
}

pub async fn update_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStaffRequest>,
) -> impl IntoResponse {
    info!("PUT /api/staff/{}", id);

    match state.staff_service.update_staff(&id, request).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Failed to update staff member", e),
    }
}

pub async fn delete_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/staff/{}", id);

    match state.staff_service.delete_staff(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete staff member", e),
    }
}

/// Clock a staff member in or out
pub async fn clock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ClockRequest>,
) -> impl IntoResponse {
    info!("POST /api/staff/{}/clock - {:?}", id, request.direction);

    match state.staff_service.clock(&id, request.direction).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("Failed to record clock event", e),
    }
}

pub async fn recompute_totals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecomputeTotalsRequest>,
) -> impl IntoResponse {
    info!("POST /api/staff/{}/recompute - {:?}", id, request);

    match state
        .staff_service
        .recompute_monthly_totals(&id, request.year, request.month)
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Failed to recompute totals", e),
    }
}

pub async fn reset_monthly_totals(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/staff/reset-totals");

    match state.staff_service.reset_monthly_totals().await {
        Ok(count) => (StatusCode::OK, Json(serde_json::json!({ "reset": count }))).into_response(),
        Err(e) => error_response("Failed to reset monthly totals", e),
    }
}

pub async fn payroll_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/staff/payroll");

    match state.staff_service.payroll_summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response("Failed to build payroll summary", e),
    }
}

pub async fn add_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddStaffDocumentRequest>,
) -> impl IntoResponse {
    info!("POST /api/staff/{}/documents - request: {:?}", id, request);

    match state.staff_service.add_document(&id, request).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => error_response("Failed to add staff document", e),
    }
}

pub async fn remove_document(
    State(state): State<AppState>,
    Path((id, document_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/staff/{}/documents/{}", id, document_id);

    match state.staff_service.remove_document(&id, &document_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Failed to remove staff document", e),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/staff/login - username: {}", request.username);

    match state
        .staff_service
        .authenticate(&request.username, &request.password)
        .await
    {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Sign-in failed", e),
    }
}
