use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    auth::{TokenPair, TokenValidation},
    auth::session::LogoutResponse,
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub access_token: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/google/callback", get(google_callback))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/auth/validate", post(validate))
        .with_state(state)
}

/// Finishes the OAuth dance and hands the token pair to the frontend via
/// the redirect query string.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    let redirect = state.sessions.complete_login(&query.code).await?;
    Ok(Redirect::temporary(&redirect.redirect_url))
}

async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<TokenPair> {
    let pair = state.sessions.refresh(&body.refresh_token).await?;
    JsonApiResponse::ok(pair)
}

async fn logout(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> ApiResult<LogoutResponse> {
    let result = state.sessions.logout(&body.refresh_token).await?;
    JsonApiResponse::ok(result)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ValidateRequest>,
) -> ApiResult<TokenValidation> {
    JsonApiResponse::ok(state.sessions.validate_access_token(&body.access_token))
}
