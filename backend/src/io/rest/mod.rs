//! # REST API Interface Layer
//!
//! HTTP endpoints under `/api`. Handlers are a thin translation layer:
//! they log the request, call one domain service and map the result to a
//! status code and JSON body.
//!
//! ## Error mapping
//!
//! | Domain error   | Status |
//! |----------------|--------|
//! | `NotFound`     | 404    |
//! | `Validation`   | 400    |
//! | `InvalidState` | 409    |
//! | `Unauthorized` | 401    |
//! | `Storage`      | 500    |
//!
//! Every error body is an [`ErrorResponse`]. Storage failures are logged
//! in full but reported to the client with a generic message.

pub mod advisor_apis;
pub mod asset_apis;
pub mod dashboard_apis;
pub mod document_apis;
pub mod export_apis;
pub mod inventory_apis;
pub mod pairing_apis;
pub mod rental_apis;
pub mod staff_apis;
pub mod subscription_apis;
pub mod task_apis;
pub mod treasury_apis;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use log::error;
use shared::ErrorResponse;

use crate::domain::DomainError;
use crate::AppState;

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/inventory", inventory_apis::router())
        .nest("/assets", asset_apis::router())
        .nest("/staff", staff_apis::router())
        .nest("/tasks", task_apis::router())
        .nest("/documents", document_apis::router())
        .nest("/treasury", treasury_apis::router())
        .nest("/rentals", rental_apis::router())
        .nest("/subscriptions", subscription_apis::router())
        .nest("/dashboard", dashboard_apis::router())
        .nest("/advisor", advisor_apis::router())
        .nest("/pairing", pairing_apis::router())
        .nest("/data", export_apis::router())
}

pub fn status_for(err: &DomainError) -> (StatusCode, &'static str) {
    match err {
        DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
        DomainError::InvalidState(_) => (StatusCode::CONFLICT, "invalid_state"),
        DomainError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
        DomainError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage"),
    }
}

/// Log a failed operation and turn the error into a JSON response
pub fn error_response(action: &str, err: DomainError) -> Response {
    error!("{}: {:#}", action, err);
    let (status, code) = status_for(&err);
    let message = match err {
        DomainError::Storage(_) => "Internal storage error".to_string(),
        other => other.to_string(),
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message,
        }),
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::to_bytes;
    use axum::response::Response;
    use serde::de::DeserializeOwned;

    use crate::config::AppConfig;
    use crate::storage::test_utils::memory_connection;
    use crate::AppState;

    pub async fn test_state() -> AppState {
        AppState::new(memory_connection().await, AppConfig::default())
            .expect("Failed to build test state")
    }

    pub async fn json_body<T: DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        serde_json::from_slice(&bytes).expect("Body is not the expected JSON")
    }
}
