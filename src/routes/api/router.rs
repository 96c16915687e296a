use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

use super::{auth, public, roles, sprints, tags, tasks, time_requests, users};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(auth::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(roles::router(state.clone()))
        .merge(tasks::router(state.clone()))
        .merge(sprints::router(state.clone()))
        .merge(tags::router(state.clone()))
        .merge(time_requests::router(state))
}
