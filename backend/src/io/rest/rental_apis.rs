//! # REST API for Rentals

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use log::info;
use shared::{
    AddRentalPaymentRequest, CreateRentalUnitRequest, MarkPaymentPaidRequest,
    UpdateRentalUnitRequest,
};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for rental related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_units).post(create_unit))
        .route("/overdue", get(overdue_payments))
        .route("/:id", get(get_unit).put(update_unit).delete(delete_unit))
        .route("/:id/payments", post(add_payment))
        .route("/:id/payments/:payment_id/paid", post(mark_paid))
}

pub async fn list_units(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/rentals");

    match state.rental_service.list_units().await {
        Ok(units) => (StatusCode::OK, Json(units)).into_response(),
        Err(e) => error_response("Failed to list rental units", e),
    }
}

pub async fn create_unit(
    State(state): State<AppState>,
    Json(request): Json<CreateRentalUnitRequest>,
) -> impl IntoResponse {
    info!("POST /api/rentals - request: {:?}", request);

    match state.rental_service.create_unit(request).await {
        Ok(unit) => (StatusCode::CREATED, Json(unit)).into_response(),
        Err(e) => error_response("Failed to create rental unit", e),
    }
}

pub async fn get_unit(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/rentals/{}", id);

    match state.rental_service.get_unit(&id).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => error_response("Failed to get rental unit", e),
    }
}

pub async fn update_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRentalUnitRequest>,
) -> impl IntoResponse {
    info!("PUT /api/rentals/{} - request: {:?}", id, request);

    match state.rental_service.update_unit(&id, request).await {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => error_response("Failed to update rental unit", e),
    }
}

pub async fn delete_unit(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/rentals/{}", id);

    match state.rental_service.delete_unit(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete rental unit", e),
    }
}

pub async fn add_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AddRentalPaymentRequest>,
) -> impl IntoResponse {
    info!("POST /api/rentals/{}/payments - request: {:?}", id, request);

    match state.rental_service.add_payment(&id, request).await {
        Ok(unit) => (StatusCode::CREATED, Json(unit)).into_response(),
        Err(e) => error_response("Failed to add rental payment", e),
    }
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(String, String)>,
    Json(request): Json<MarkPaymentPaidRequest>,
) -> impl IntoResponse {
    info!("POST /api/rentals/{}/payments/{}/paid", id, payment_id);

    match state
        .rental_service
        .mark_paid(&id, &payment_id, request.paid_date)
        .await
    {
        Ok(unit) => (StatusCode::OK, Json(unit)).into_response(),
        Err(e) => error_response("Failed to mark payment paid", e),
    }
}

pub async fn overdue_payments(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/rentals/overdue");

    let today = Utc::now().date_naive();
    match state.rental_service.overdue(today).await {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => error_response("Failed to list overdue payments", e),
    }
}
