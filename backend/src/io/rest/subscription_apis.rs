//! # REST API for Subscriptions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use log::info;
use serde::Deserialize;
use shared::{CreateSubscriptionRequest, UpdateSubscriptionRequest};

use crate::io::rest::error_response;
use crate::AppState;

const DEFAULT_DUE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub days: Option<i64>,
}

/// Create a router for subscription related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscriptions).post(create_subscription))
        .route("/due", get(due_subscriptions))
        .route("/monthly-cost", get(monthly_cost))
        .route(
            "/:id",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
        .route("/:id/renew", post(renew_subscription))
}

pub async fn list_subscriptions(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/subscriptions");

    match state.subscription_service.list_subscriptions().await {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(e) => error_response("Failed to list subscriptions", e),
    }
}

pub async fn create_subscription(
    State(state): State<AppState>,
    Json(request): Json<CreateSubscriptionRequest>,
) -> impl IntoResponse {
    info!("POST /api/subscriptions - request: {:?}", request);

    match state.subscription_service.create_subscription(request).await {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(e) => error_response("Failed to create subscription", e),
    }
}

pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/subscriptions/{}", id);

    match state.subscription_service.get_subscription(&id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(e) => error_response("Failed to get subscription", e),
    }
}

pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateSubscriptionRequest>,
) -> impl IntoResponse {
    info!("PUT /api/subscriptions/{} - request: {:?}", id, request);

    match state.subscription_service.update_subscription(&id, request).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(e) => error_response("Failed to update subscription", e),
    }
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/subscriptions/{}", id);

    match state.subscription_service.delete_subscription(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete subscription", e),
    }
}

/// Advance the next billing date by one cycle
pub async fn renew_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/subscriptions/{}/renew", id);

    match state.subscription_service.renew(&id).await {
        Ok(subscription) => (StatusCode::OK, Json(subscription)).into_response(),
        Err(e) => error_response("Failed to renew subscription", e),
    }
}

pub async fn due_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> impl IntoResponse {
    info!("GET /api/subscriptions/due - query: {:?}", query);

    let today = Utc::now().date_naive();
    let days = query.days.unwrap_or(DEFAULT_DUE_WINDOW_DAYS);
    match state.subscription_service.due_within(today, days).await {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(e) => error_response("Failed to list due subscriptions", e),
    }
}

pub async fn monthly_cost(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/subscriptions/monthly-cost");

    match state.subscription_service.monthly_cost().await {
        Ok(cost) => (StatusCode::OK, Json(serde_json::json!({ "monthly_cost": cost }))).into_response(),
        Err(e) => error_response("Failed to compute subscription cost", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{json_body, test_state};
    use shared::Subscription;

    #[tokio::test]
    async fn test_due_window_is_bounded() {
        let state = test_state().await;

        let response = due_subscriptions(State(state.clone()), Query(DueQuery { days: Some(1_000_000_000) }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = due_subscriptions(State(state), Query(DueQuery { days: None }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let due: Vec<Subscription> = json_body(response).await;
        assert!(due.is_empty());
    }
}
