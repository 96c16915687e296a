use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::TaskSearch,
    db::entities::task,
    error::AppError,
    middleware::{AuthGuard, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    services::task_service::{CreateTaskInput, UpdateTaskInput},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TaskSearchQuery {
    pub sprint_id: Option<Uuid>,
    #[serde(default)]
    pub q: Option<String>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TaskSearchResponse {
    pub items: Vec<task::Model>,
    pub page: u64,
    pub page_size: u64,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", post(create))
        .route("/tasks/search", get(search))
        .route(
            "/tasks/{id}",
            get(get_one).patch(update).delete(remove),
        )
        .route("/tasks/{id}/assign", post(assign))
        .route("/tasks/{id}/subtasks", get(subtasks))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CreateTaskInput>,
) -> ApiResult<task::Model> {
    let author = parse_subject(&claims.sub)?;
    let task = ServiceContext::from_state(state.as_ref())
        .task()
        .create(&author, body)
        .await?;
    JsonApiResponse::ok(task)
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<task::Model> {
    let task = ServiceContext::from_state(state.as_ref())
        .task()
        .get(&id)
        .await?;
    JsonApiResponse::ok(task)
}

async fn update(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskInput>,
) -> ApiResult<task::Model> {
    let author = parse_subject(&claims.sub)?;
    let task = ServiceContext::from_state(state.as_ref())
        .task()
        .update(&author, &id, body)
        .await?;
    JsonApiResponse::ok(task)
}

async fn remove(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let author = parse_subject(&claims.sub)?;
    ServiceContext::from_state(state.as_ref())
        .task()
        .delete(&author, &id)
        .await?;
    JsonApiResponse::ok(serde_json::json!({ "deleted": true }))
}

async fn assign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignRequest>,
) -> ApiResult<task::Model> {
    let task = ServiceContext::from_state(state.as_ref())
        .task()
        .assign(&id, body.assigned_to)
        .await?;
    JsonApiResponse::ok(task)
}

async fn subtasks(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<task::Model>> {
    let subtasks = ServiceContext::from_state(state.as_ref())
        .task()
        .subtasks(&id)
        .await?;
    JsonApiResponse::ok(subtasks)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskSearchQuery>,
) -> ApiResult<TaskSearchResponse> {
    let response = ServiceContext::from_state(state.as_ref())
        .task()
        .search(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(20),
            TaskSearch {
                sprint_id: query.sprint_id,
                text: query.q,
                created_by: query.created_by,
                assigned_to: query.assigned_to,
                priority: query.priority,
                status: query.status,
                tag: query.tag,
                include_deleted: query.include_deleted,
            },
        )
        .await?;
    let total_pages = response.total_pages();
    JsonApiResponse::ok(TaskSearchResponse {
        items: response.data,
        page: response.page,
        page_size: response.page_size,
        total: response.total,
        total_pages,
    })
}

fn parse_subject(sub: &str) -> Result<Uuid, AppError> {
    sub.parse::<Uuid>()
        .map_err(|_| AppError::unauthorized("Access token invalid"))
}
