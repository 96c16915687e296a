use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{
    auth::google::{GoogleAuthClient, GoogleTokenResponse},
    auth::{AuthKeys, SessionManager},
    config::{AppConfig, AuthConfig},
    error::AppError,
    routes::router,
    services::ServiceContext,
    state::AppState,
};

/// Google client that hands back a canned exchange response, so router
/// tests never talk to the network.
pub struct StaticGoogleAuthClient {
    pub response: GoogleTokenResponse,
}

#[async_trait]
impl GoogleAuthClient for StaticGoogleAuthClient {
    async fn exchange_code(&self, _code: &str) -> Result<GoogleTokenResponse, AppError> {
        Ok(self.response.clone())
    }
}

/// Unsigned-but-wellformed ID token; only the payload segment is read.
pub fn fake_id_token(sub: &str, email: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({ "sub": sub, "email": email })
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{payload}.sig")
}

pub fn router_with_db(db: DatabaseConnection, secret: &str) -> Router {
    let mut cfg = AppConfig::default();
    cfg.auth = Some(AuthConfig {
        jwt_secret: secret.to_string(),
        jwt_refresh_secret: None,
    });

    let services = ServiceContext::new(&db);
    let keys = AuthKeys::from_config(cfg.auth.as_ref().expect("auth config should be present"));
    let google = Arc::new(StaticGoogleAuthClient {
        response: GoogleTokenResponse {
            access_token: "google-access".to_string(),
            refresh_token: Some("google-refresh".to_string()),
            id_token: fake_id_token("google-sub-1", "alice@example.com"),
            expires_in: Some(3600),
            scope: Some("openid email".to_string()),
        },
    });
    let sessions = SessionManager::new(
        services.user(),
        services.refresh_session_dao(),
        google,
        keys,
        "https://app.example.com/callback",
    );

    let state = AppState::new(cfg, db, sessions);
    router(state)
}

pub fn test_router(secret: &str) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    router_with_db(db, secret)
}
