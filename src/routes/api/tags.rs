use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::entities::task_tag,
    middleware::{RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    services::tag_service::{CreateTagInput, UpdateTagInput},
    state::AppState,
};

use super::ADMINS;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TagSearchQuery {
    #[serde(default)]
    pub q: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/tags", post(create))
        .route("/tags/{id}", axum::routing::patch(update).delete(remove))
        .route("/tags/{id}/restore", post(restore))
        .route_layer(RequireRoleLayer::new(Arc::clone(&state), ADMINS));

    Router::new()
        .route("/tags", get(list))
        .route("/tags/search", get(search))
        .route("/tags/{id}", get(get_one))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTagInput>,
) -> ApiResult<task_tag::Model> {
    let tag = ServiceContext::from_state(state.as_ref())
        .tag()
        .create(body)
        .await?;
    JsonApiResponse::ok(tag)
}

async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTagInput>,
) -> ApiResult<task_tag::Model> {
    let tag = ServiceContext::from_state(state.as_ref())
        .tag()
        .update(&id, body)
        .await?;
    JsonApiResponse::ok(tag)
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<task_tag::Model> {
    let tag = ServiceContext::from_state(state.as_ref())
        .tag()
        .get(&id)
        .await?;
    JsonApiResponse::ok(tag)
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<task_tag::Model>> {
    let tags = ServiceContext::from_state(state.as_ref())
        .tag()
        .list(query.page.unwrap_or(1), query.page_size.unwrap_or(50))
        .await?;
    JsonApiResponse::ok(tags)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagSearchQuery>,
) -> ApiResult<Vec<task_tag::Model>> {
    let tags = ServiceContext::from_state(state.as_ref())
        .tag()
        .search(&query.q)
        .await?;
    JsonApiResponse::ok(tags)
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    ServiceContext::from_state(state.as_ref())
        .tag()
        .delete(&id)
        .await?;
    JsonApiResponse::ok(serde_json::json!({ "deleted": true }))
}

async fn restore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<task_tag::Model> {
    let tag = ServiceContext::from_state(state.as_ref())
        .tag()
        .restore(&id)
        .await?;
    JsonApiResponse::ok(tag)
}
