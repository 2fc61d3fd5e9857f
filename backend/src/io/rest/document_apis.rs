//! # REST API for Compliance Documents

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::Utc;
use log::info;
use shared::{CreateDocumentRequest, UpdateDocumentRequest};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for document related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents).post(create_document))
        .route("/expiring", get(expiring_documents))
        .route(
            "/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
}

pub async fn list_documents(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/documents");

    let today = Utc::now().date_naive();
    match state.document_service.list_documents(today).await {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(e) => error_response("Failed to list documents", e),
    }
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> impl IntoResponse {
    info!("POST /api/documents - request: {:?}", request);

    match state.document_service.create_document(request).await {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(e) => error_response("Failed to create document", e),
    }
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/documents/{}", id);

    let today = Utc::now().date_naive();
    match state.document_service.get_document(&id, today).await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(e) => error_response("Failed to get document", e),
    }
}

pub async fn update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDocumentRequest>,
) -> impl IntoResponse {
    info!("PUT /api/documents/{} - request: {:?}", id, request);

    match state.document_service.update_document(&id, request).await {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(e) => error_response("Failed to update document", e),
    }
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/documents/{}", id);

    match state.document_service.delete_document(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete document", e),
    }
}

/// Documents expired or inside their own reminder window
pub async fn expiring_documents(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/documents/expiring");

    let today = Utc::now().date_naive();
    match state.document_service.expiring(today).await {
        Ok(documents) => (StatusCode::OK, Json(documents)).into_response(),
        Err(e) => error_response("Failed to list expiring documents", e),
    }
}
