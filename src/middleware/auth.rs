use std::{
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{Request as HttpRequest, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::{
    auth::token::{TokenError, verify_token},
    auth::{Claims, Role},
    db::dao::{DaoBase, RoleDao},
    error::AppError,
    state::AppState,
};

/// Pulls the bearer token out of the Authorization header. A missing
/// header and a wrong scheme are distinct failures.
fn bearer_token(headers: &axum::http::HeaderMap) -> Result<&str, AppError> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

    auth.strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid Authorization format"))
}

fn verify_access(state: &AppState, token: &str) -> Result<Claims, AppError> {
    verify_token(&state.sessions.keys().access, token).map_err(|err| match err {
        TokenError::Expired => AppError::unauthorized("Access token expired"),
        _ => AppError::unauthorized("Access token invalid"),
    })
}

/// Authentication middleware: verifies the access token and stores Claims
/// in the request extensions for downstream layers and handlers.
pub async fn jwt_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers()).map_err(|err| err.into_response())?;
    let claims = verify_access(&state, token).map_err(|err| err.into_response())?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

impl FromRequestParts<Arc<AppState>> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claims) = parts.extensions.get::<Claims>().cloned() {
            return Ok(claims);
        }

        let token = bearer_token(&parts.headers)?;
        let claims = verify_access(state, token)?;

        parts.extensions.insert(claims.clone());
        Ok(claims)
    }
}

pub type AuthGuard = Claims;

/// Authorization gate: requires the subject's stored role to be a member
/// of the configured set. An empty set means authenticated-only. Must run
/// after `jwt_auth`, which is what puts Claims into the extensions.
#[derive(Clone)]
pub struct RequireRoleLayer {
    state: Arc<AppState>,
    allowed: &'static [Role],
}

impl RequireRoleLayer {
    pub fn new(state: Arc<AppState>, allowed: &'static [Role]) -> Self {
        Self { state, allowed }
    }
}

#[derive(Clone)]
pub struct RequireRole<S> {
    inner: S,
    state: Arc<AppState>,
    allowed: &'static [Role],
}

impl<S> Layer<S> for RequireRoleLayer {
    type Service = RequireRole<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequireRole {
            inner,
            state: Arc::clone(&self.state),
            allowed: self.allowed,
        }
    }
}

impl<S> Service<HttpRequest<Body>> for RequireRole<S>
where
    S: Service<HttpRequest<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: HttpRequest<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let allowed = self.allowed;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let claims = match req.extensions().get::<Claims>() {
                Some(claims) => claims.clone(),
                None => {
                    return Ok(
                        AppError::unauthorized("Missing Authorization header").into_response()
                    );
                }
            };

            if allowed.is_empty() {
                return inner.call(req).await;
            }

            let user_id = match uuid::Uuid::parse_str(&claims.sub) {
                Ok(user_id) => user_id,
                Err(_) => {
                    return Ok(AppError::unauthorized("Access token invalid").into_response());
                }
            };

            let role_dao = RoleDao::new(&state.db);
            let role = match role_dao.find_by_user(&user_id).await {
                Ok(assignment) => assignment.and_then(|a| Role::try_from(a.role.as_str()).ok()),
                Err(err) => {
                    return Ok(AppError::from(err).into_response());
                }
            };

            match role {
                Some(role) if allowed.contains(&role) => inner.call(req).await,
                _ => Ok(AppError::forbidden("Insufficient role").into_response()),
            }
        })
    }
}
