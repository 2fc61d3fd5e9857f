//! # REST API for Device Pairing

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use shared::{CreatePairingRequest, LoginRequest};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for pairing related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_session))
        .route("/:id", get(session_status))
        .route("/:id/authenticate", post(authenticate_session))
        .route("/:id/claim", post(claim_session))
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreatePairingRequest>,
) -> impl IntoResponse {
    info!("POST /api/pairing - request: {:?}", request);

    match state.pairing_service.create_session(request.device_label).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => error_response("Failed to create pairing session", e),
    }
}

/// Polled by the new device until the session is authenticated
pub async fn session_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/pairing/{}", id);

    match state.pairing_service.status(&id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response("Failed to get pairing status", e),
    }
}

pub async fn authenticate_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    info!("POST /api/pairing/{}/authenticate - username: {}", id, request.username);

    match state
        .pairing_service
        .authenticate(&id, &request.username, &request.password)
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(e) => error_response("Failed to authenticate pairing session", e),
    }
}

pub async fn claim_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/pairing/{}/claim", id);

    match state.pairing_service.claim(&id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => error_response("Failed to claim pairing session", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{json_body, test_state};
    use shared::PairingSessionResponse;

    #[tokio::test]
    async fn test_unapproved_claim_conflicts_and_unknown_session_is_not_found() {
        let state = test_state().await;
        let response = create_session(State(state.clone()), Json(CreatePairingRequest::default()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        let session: PairingSessionResponse = json_body(response).await;

        let response = claim_session(State(state.clone()), Path(session.id)).await.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = session_status(State(state), Path("unknown".to_string()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
