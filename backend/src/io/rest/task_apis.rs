//! # REST API for Tasks

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use log::info;
use shared::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest};

use crate::io::rest::error_response;
use crate::AppState;

/// Create a router for task related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
        .route("/:id/complete", post(complete_task))
        .route("/:id/reopen", post(reopen_task))
        .route("/:id/checklist/:item_id/toggle", post(toggle_checklist_item))
}

/// List tasks, optionally filtered by assignee and status
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<TaskListQuery>,
) -> impl IntoResponse {
    info!("GET /api/tasks - query: {:?}", query);

    match state.task_service.list_tasks(&query).await {
        Ok(tasks) => (StatusCode::OK, Json(tasks)).into_response(),
        Err(e) => error_response("Failed to list tasks", e),
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks - request: {:?}", request);

    match state.task_service.create_task(request).await {
        Ok(task) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => error_response("Failed to create task", e),
    }
}

pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("GET /api/tasks/{}", id);

    match state.task_service.get_task(&id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Failed to get task", e),
    }
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    info!("PUT /api/tasks/{} - request: {:?}", id, request);

    match state.task_service.update_task(&id, request).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Failed to update task", e),
    }
}

pub async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/tasks/{}", id);

    match state.task_service.delete_task(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response("Failed to delete task", e),
    }
}

pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/complete", id);

    match state.task_service.complete(&id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Failed to complete task", e),
    }
}

pub async fn reopen_task(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    info!("POST /api/tasks/{}/reopen", id);

    match state.task_service.reopen(&id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Failed to reopen task", e),
    }
}

pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/checklist/{}/toggle", id, item_id);

    match state.task_service.toggle_checklist_item(&id, &item_id).await {
        Ok(task) => (StatusCode::OK, Json(task)).into_response(),
        Err(e) => error_response("Failed to toggle checklist item", e),
    }
}
