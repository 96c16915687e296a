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
    db::entities::user,
    error::AppError,
    middleware::{AuthGuard, RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

use super::SUPERADMIN;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let superadmin_routes = Router::new()
        .route("/users/search", get(search))
        .route("/users/{id}/approve", post(approve))
        .route("/users/{id}/reject", post(reject))
        .route("/users/{id}/suspend", post(suspend))
        .route_layer(RequireRoleLayer::new(Arc::clone(&state), SUPERADMIN));

    Router::new()
        .route("/users/me", get(me))
        .route("/users/{id}", get(get_one))
        .merge(superadmin_routes)
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn me(State(state): State<Arc<AppState>>, claims: AuthGuard) -> ApiResult<user::Model> {
    let id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AppError::unauthorized("Access token invalid"))?;
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    JsonApiResponse::ok(user)
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    JsonApiResponse::ok(user)
}

async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserSearchQuery>,
) -> ApiResult<PaginatedResponse<user::Model>> {
    let response = ServiceContext::from_state(state.as_ref())
        .user()
        .search(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(20),
            query.q.as_deref(),
            query.status.as_deref(),
        )
        .await?;
    JsonApiResponse::ok(response)
}

async fn approve(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    let approver = parse_subject(&claims.sub)?;
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .approve(&id, &approver)
        .await?;
    JsonApiResponse::ok(user)
}

async fn reject(
    State(state): State<Arc<AppState>>,
    claims: AuthGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> ApiResult<user::Model> {
    let approver = parse_subject(&claims.sub)?;
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .reject(&id, &approver, body.reason)
        .await?;
    JsonApiResponse::ok(user)
}

async fn suspend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    let user = ServiceContext::from_state(state.as_ref())
        .user()
        .suspend(&id)
        .await?;
    JsonApiResponse::ok(user)
}

fn parse_subject(sub: &str) -> Result<Uuid, AppError> {
    sub.parse::<Uuid>()
        .map_err(|_| AppError::unauthorized("Access token invalid"))
}
