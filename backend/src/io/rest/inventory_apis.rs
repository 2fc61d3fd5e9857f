//! # REST API for Inventory
//!
//! Stock items, withdrawals, count adjustments and the movement log.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use serde::Deserialize;
use shared::{
    AdjustStockRequest, CreateInventoryItemRequest, UpdateInventoryItemRequest,
    WithdrawStockRequest,
};

use crate::io::rest::error_response;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub item_id: Option<String>,
}

/// Create a router for inventory related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(low_stock))
        .route("/movements", get(list_movements))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/withdraw", post(withdraw_stock))
        .route("/:id/adjust", post(adjust_stock))
}

pub async fn list_items(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/inventory");

    match state.inventory_service.list_items().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => error_response("Failed to list inventory", e),
    }
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(request): Json<CreateInventoryItemRequest>,
) -> impl IntoResponse {
    info!("POST /api/inventory - request: {:?}", request);

    match state.inventory_service.create_item(request).await {
        Ok(item) => (StatusCode::CREATED, Json(item)).into_response(),
        Err(e) => error_response("Failed to create inventory item", e),
    }
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/inventory/{}", id);

    match state.inventory_service.get_item(&id).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response("Failed to get inventory item", e),
    }
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateInventoryItemRequest>,
) -> impl IntoResponse {
    info!("PUT /api/inventory/{} - request: {:?}", id, request);

    match state.inventory_service.update_item(&id, request).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response("Failed to update inventory item", e),
    }
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/inventory/{}", id);

    match state.inventory_service.delete_item(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete inventory item", e),
    }
}

/// Withdraw stock (positive quantity) or put it back (negative)
pub async fn withdraw_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<WithdrawStockRequest>,
) -> impl IntoResponse {
    info!("POST /api/inventory/{}/withdraw - request: {:?}", id, request);

    match state.inventory_service.withdraw(&id, request).await {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(e) => error_response("Failed to withdraw stock", e),
    }
}

/// Reconcile with a physical count
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AdjustStockRequest>,
) -> impl IntoResponse {
    info!("POST /api/inventory/{}/adjust - request: {:?}", id, request);

    match state.inventory_service.adjust(&id, request).await {
        Ok(change) => (StatusCode::OK, Json(change)).into_response(),
        Err(e) => error_response("Failed to adjust stock", e),
    }
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> impl IntoResponse {
    info!("GET /api/inventory/movements - query: {:?}", query);

    match state
        .inventory_service
        .list_movements(query.item_id.as_deref())
        .await
    {
        Ok(movements) => (StatusCode::OK, Json(movements)).into_response(),
        Err(e) => error_response("Failed to list stock movements", e),
    }
}

pub async fn low_stock(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/inventory/low-stock");

    match state.inventory_service.low_stock().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => error_response("Failed to list low stock", e),
    }
}
