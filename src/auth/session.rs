use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::google::{GoogleAuthClient, decode_id_token_payload};
use super::token::{
    ACCESS_TTL_SECS, AuthKeys, REFRESH_TTL_SECS, TokenError, hash_token, make_claims, sign_token,
    verify_token,
};
use super::types::{TokenPair, TokenValidation};
use crate::{
    db::dao::RefreshSessionDao,
    db::entities::user,
    error::AppError,
    services::user_service::UserService,
};

#[derive(Debug, Serialize)]
pub struct LoginRedirect {
    pub redirect_url: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Orchestrates the Google login flow and the refresh-token lifecycle.
/// Access tokens are stateless; refresh tokens are rotated on every use and
/// validated against the session store.
#[derive(Clone)]
pub struct SessionManager {
    users: UserService,
    sessions: RefreshSessionDao,
    google: Arc<dyn GoogleAuthClient>,
    keys: AuthKeys,
    frontend_callback_url: String,
}

impl SessionManager {
    pub fn new(
        users: UserService,
        sessions: RefreshSessionDao,
        google: Arc<dyn GoogleAuthClient>,
        keys: AuthKeys,
        frontend_callback_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            sessions,
            google,
            keys,
            frontend_callback_url: frontend_callback_url.into(),
        }
    }

    /// Full login: code exchange, identity decode, transactional user
    /// upsert, then a fresh token pair. Nothing is persisted when the
    /// exchange fails.
    pub async fn complete_login(&self, code: &str) -> Result<LoginRedirect, AppError> {
        if code.trim().is_empty() {
            return Err(AppError::bad_request("Missing authorization code"));
        }

        let tokens = self.google.exchange_code(code).await?;
        let identity = decode_id_token_payload(&tokens.id_token)?;

        let now = Utc::now().fixed_offset();
        let user = self
            .users
            .upsert_google_user(&identity, &tokens, &now)
            .await?;

        let pair = self.issue_pair(&user).await?;
        tracing::info!(user_id = %user.id, "login completed");

        let redirect_url = format!(
            "{}?token={}&rt={}&tokenExp={}&rtExp={}",
            self.frontend_callback_url,
            pair.access_token,
            pair.refresh_token,
            pair.access_expires_in,
            pair.refresh_expires_in,
        );
        Ok(LoginRedirect { redirect_url })
    }

    /// Rotation on use: the presented session is closed before its
    /// successor is written. The store decides expiry; the signature only
    /// proves the token was not tampered with.
    pub async fn refresh(&self, raw: &str) -> Result<TokenPair, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::bad_request("Missing refresh token"));
        }

        let claims = verify_token(&self.keys.refresh, raw).map_err(|err| match err {
            TokenError::Expired => AppError::unauthorized("Refresh token expired"),
            _ => AppError::unauthorized("Invalid refresh token"),
        })?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;

        let hash = hash_token(raw);
        let session = self
            .sessions
            .find_active_by_hash(&user_id, &hash)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        let now = Utc::now().fixed_offset();
        if session.expires_at <= now {
            return Err(AppError::unauthorized("Refresh token expired"));
        }

        let user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

        let successor_token_id = Uuid::new_v4();
        self.sessions
            .mark_rotated(&session.id, &successor_token_id, &now)
            .await?;
        self.mint_and_store(&user, successor_token_id).await
    }

    /// Idempotent: revoking an unknown or already-closed token still
    /// reports success.
    pub async fn logout(&self, raw: &str) -> Result<LogoutResponse, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::bad_request("Missing refresh token"));
        }
        let now = Utc::now().fixed_offset();
        self.sessions.revoke_by_hash(&hash_token(raw), &now).await?;
        Ok(LogoutResponse { success: true })
    }

    /// Stateless check against the access secret. Never consults the store.
    pub fn validate_access_token(&self, raw: &str) -> TokenValidation {
        if raw.trim().is_empty() {
            return TokenValidation::invalid("Missing access token");
        }
        match verify_token(&self.keys.access, raw) {
            Ok(claims) => TokenValidation::valid(claims),
            Err(TokenError::Expired) => TokenValidation::invalid("Access token expired"),
            Err(_) => TokenValidation::invalid("Access token invalid"),
        }
    }

    pub fn keys(&self) -> &AuthKeys {
        &self.keys
    }

    async fn issue_pair(&self, user: &user::Model) -> Result<TokenPair, AppError> {
        self.mint_and_store(user, Uuid::new_v4()).await
    }

    async fn mint_and_store(
        &self,
        user: &user::Model,
        token_id: Uuid,
    ) -> Result<TokenPair, AppError> {
        let access_claims = make_claims(&user.id, &user.email, ACCESS_TTL_SECS);
        let refresh_claims = make_claims(&user.id, &user.email, REFRESH_TTL_SECS);
        let access_token = sign_token(&self.keys.access, &access_claims)?;
        let refresh_token = sign_token(&self.keys.refresh, &refresh_claims)?;

        let now = Utc::now().fixed_offset();
        let expires_at = now + Duration::seconds(REFRESH_TTL_SECS as i64);
        self.sessions
            .create_session(
                &user.id,
                &token_id,
                &hash_token(&refresh_token),
                &now,
                &expires_at,
            )
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: ACCESS_TTL_SECS,
            refresh_expires_in: REFRESH_TTL_SECS,
        })
    }
}
