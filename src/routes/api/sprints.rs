use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::entities::sprint,
    middleware::{RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    services::sprint_service::CreateSprintInput,
    state::AppState,
};

use super::ADMINS;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/sprints", post(create))
        .route("/sprints/{id}", delete(remove))
        .route("/sprints/{id}/restore", post(restore))
        .route_layer(RequireRoleLayer::new(Arc::clone(&state), ADMINS));

    Router::new()
        .route("/sprints", get(list))
        .route("/sprints/{id}", get(get_one))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSprintInput>,
) -> ApiResult<sprint::Model> {
    let sprint = ServiceContext::from_state(state.as_ref())
        .sprint()
        .create(body)
        .await?;
    JsonApiResponse::ok(sprint)
}

async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Vec<sprint::Model>> {
    let sprints = ServiceContext::from_state(state.as_ref())
        .sprint()
        .list(query.page.unwrap_or(1), query.page_size.unwrap_or(20))
        .await?;
    JsonApiResponse::ok(sprints)
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<sprint::Model> {
    let sprint = ServiceContext::from_state(state.as_ref())
        .sprint()
        .get(&id)
        .await?;
    JsonApiResponse::ok(sprint)
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    ServiceContext::from_state(state.as_ref())
        .sprint()
        .delete(&id)
        .await?;
    JsonApiResponse::ok(serde_json::json!({ "deleted": true }))
}

async fn restore(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<sprint::Model> {
    let sprint = ServiceContext::from_state(state.as_ref())
        .sprint()
        .restore(&id)
        .await?;
    JsonApiResponse::ok(sprint)
}
