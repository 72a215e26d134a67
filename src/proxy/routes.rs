use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::client::API_PATH;
use crate::models::{CreateTaskRequest, UpdateTaskRequest};
use crate::proxy::notion::{NotionClient, NotionError};

pub struct ProxyState {
    pub notion: NotionClient,
}

pub type SharedState = Arc<ProxyState>;

type HandlerResult = Result<Json<Value>, (StatusCode, String)>;

pub fn get_router(state: SharedState) -> Router {
    Router::new()
        .route(
            API_PATH,
            get(TaskController::list)
                .post(TaskController::create)
                .patch(TaskController::update),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct TaskController {}

impl TaskController {
    pub async fn list(State(state): State<SharedState>) -> HandlerResult {
        state
            .notion
            .query_database()
            .await
            .map(Json)
            .map_err(|e| upstream_error("querying tasks", e))
    }

    pub async fn create(
        State(state): State<SharedState>,
        Json(body): Json<CreateTaskRequest>,
    ) -> HandlerResult {
        tracing::info!(title = %body.title, due_date = %body.due_date, "creating task");
        state
            .notion
            .create_page(&body)
            .await
            .map(Json)
            .map_err(|e| upstream_error("creating task", e))
    }

    pub async fn update(
        State(state): State<SharedState>,
        Json(body): Json<UpdateTaskRequest>,
    ) -> HandlerResult {
        tracing::info!(page_id = %body.page_id, "updating task");
        state
            .notion
            .update_page(&body.page_id, &body.properties)
            .await
            .map(Json)
            .map_err(|e| upstream_error("updating task", e))
    }
}

/// Client errors from Notion pass through and a malformed page id is the
/// caller's fault; everything else is a bad gateway.
fn upstream_error(operation: &str, err: NotionError) -> (StatusCode, String) {
    tracing::error!(error = %err, operation, "notion request failed");
    let status = match &err {
        NotionError::Status { status, .. } if status.is_client_error() => *status,
        NotionError::InvalidPageId(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, format!("Error while {operation}: {err}"))
}
