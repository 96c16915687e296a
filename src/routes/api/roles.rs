use std::sync::Arc;

use axum::{
    Json, Router, middleware,
    extract::{Path, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::Role,
    middleware::{RequireRoleLayer, jwt_auth},
    response::{ApiResult, JsonApiResponse},
    services::ServiceContext,
    state::AppState,
};

use super::SUPERADMIN;

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub user_id: Uuid,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct RemoveRoleResponse {
    pub removed: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/roles/{user_id}",
            get(get_role).put(set_role).delete(remove_role),
        )
        .route_layer(RequireRoleLayer::new(Arc::clone(&state), SUPERADMIN))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            jwt_auth,
        ))
        .with_state(state)
}

async fn get_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<RoleResponse> {
    let role = ServiceContext::from_state(state.as_ref())
        .role()
        .get_role(&user_id)
        .await?;
    JsonApiResponse::ok(RoleResponse { user_id, role })
}

async fn set_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<SetRoleRequest>,
) -> ApiResult<RoleResponse> {
    let role = ServiceContext::from_state(state.as_ref())
        .role()
        .set_role(&user_id, &body.role)
        .await?;
    JsonApiResponse::ok(RoleResponse {
        user_id,
        role: Some(role),
    })
}

async fn remove_role(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<RemoveRoleResponse> {
    let removed = ServiceContext::from_state(state.as_ref())
        .role()
        .remove_role(&user_id)
        .await?;
    JsonApiResponse::ok(RemoveRoleResponse { removed })
}
