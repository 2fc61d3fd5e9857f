//! # REST API for the Treasury Ledger

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get},
    Router,
};
use log::info;
use shared::{CreateTreasuryTransactionRequest, TreasuryQuery};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for treasury related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(record_transaction))
        .route("/summary", get(treasury_summary))
        .route("/categories", get(category_totals))
        .route("/:id", delete(delete_transaction))
}

/// List transactions filtered by type, category and date range
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TreasuryQuery>,
) -> impl IntoResponse {
    info!("GET /api/treasury - query: {:?}", query);

    match state.treasury_service.list(&query).await {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => error_response("Failed to list transactions", e),
    }
}

pub async fn record_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTreasuryTransactionRequest>,
) -> impl IntoResponse {
    info!("POST /api/treasury - request: {:?}", request);

    match state.treasury_service.record(request).await {
        Ok(tx) => (StatusCode::CREATED, Json(tx)).into_response(),
        Err(e) => error_response("Failed to record transaction", e),
    }
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/treasury/{}", id);

    match state.treasury_service.delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete transaction", e),
    }
}

pub async fn treasury_summary(
    State(state): State<AppState>,
    Query(query): Query<TreasuryQuery>,
) -> impl IntoResponse {
    info!("GET /api/treasury/summary - query: {:?}", query);

    match state.treasury_service.summary(&query).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response("Failed to summarize treasury", e),
    }
}

pub async fn category_totals(
    State(state): State<AppState>,
    Query(query): Query<TreasuryQuery>,
) -> impl IntoResponse {
    info!("GET /api/treasury/categories - query: {:?}", query);

    match state.treasury_service.by_category(&query).await {
        Ok(totals) => (StatusCode::OK, Json(totals)).into_response(),
        Err(e) => error_response("Failed to total treasury categories", e),
    }
}
