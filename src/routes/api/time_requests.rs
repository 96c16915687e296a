use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::PaginatedResponse,
    db::entities::time_request,
    error::AppError,
    middleware::{AuthGuard, RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    services::time_request_service::{CreateTimeRequestInput, UpdateTimeRequestInput},
    state::AppState,
};

use super::ADMINS;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AllRequestsQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/time-requests/all", get(list_all))
        .route("/time-requests/{id}/approve", post(approve))
        .route("/time-requests/{id}/reject", post(reject))
        .route_layer(RequireRoleLayer::new(Arc::clone(&state), ADMINS));

    Router::new()
        .route("/time-requests", post(create).get(list_own))
        .route(
            "/time-requests/{id}",
            axum::routing::patch(update).delete(remove),
        )
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn create(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Json(body): Json<CreateTimeRequestInput>,
) -> ApiResult<time_request::Model> {
    let author = parse_subject(&claims.sub)?;
    let request = ServiceContext::from_state(state.as_ref())
        .time_request()
        .create(&author, body)
        .await?;
    JsonApiResponse::ok(request)
}

async fn list_own(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Query(query): Query<PageQuery>,
) -> ApiResult<PaginatedResponse<time_request::Model>> {
    let author = parse_subject(&claims.sub)?;
    let response = ServiceContext::from_state(state.as_ref())
        .time_request()
        .list_own(
            &author,
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(20),
        )
        .await?;
    JsonApiResponse::ok(response)
}

async fn list_all(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AllRequestsQuery>,
) -> ApiResult<PaginatedResponse<time_request::Model>> {
    let response = ServiceContext::from_state(state.as_ref())
        .time_request()
        .list_all(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(20),
            query.kind,
            query.status,
        )
        .await?;
    JsonApiResponse::ok(response)
}

async fn update(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTimeRequestInput>,
) -> ApiResult<time_request::Model> {
    let author = parse_subject(&claims.sub)?;
    let request = ServiceContext::from_state(state.as_ref())
        .time_request()
        .update(&author, &id, body)
        .await?;
    JsonApiResponse::ok(request)
}

async fn remove(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let author = parse_subject(&claims.sub)?;
    ServiceContext::from_state(state.as_ref())
        .time_request()
        .delete(&author, &id)
        .await?;
    JsonApiResponse::ok(serde_json::json!({ "deleted": true }))
}

async fn approve(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<time_request::Model> {
    review(state, claims, id, true).await
}

async fn reject(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<time_request::Model> {
    review(state, claims, id, false).await
}

async fn review(
    state: Arc<AppState>,
    claims: AuthGuard,
    id: Uuid,
    approve: bool,
) -> ApiResult<time_request::Model> {
    let reviewer = parse_subject(&claims.sub)?;
    let request = ServiceContext::from_state(state.as_ref())
        .time_request()
        .review(&reviewer, &id, approve)
        .await?;
    JsonApiResponse::ok(request)
}

fn parse_subject(sub: &str) -> Result<Uuid, AppError> {
    sub.parse::<Uuid>()
        .map_err(|_| AppError::unauthorized("Access token invalid"))
}
