use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::Deserialize;

use crate::{config::GoogleConfig, error::AppError};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Token bundle returned by Google's code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl GoogleTokenResponse {
    pub fn grants_calendar(&self) -> bool {
        self.scope
            .as_deref()
            .map(|scope| scope.contains(CALENDAR_SCOPE))
            .unwrap_or(false)
    }
}

/// Profile fields carried in the ID token's payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdentity {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[async_trait]
pub trait GoogleAuthClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse, AppError>;
}

pub struct HttpGoogleAuthClient {
    http: reqwest::Client,
    cfg: GoogleConfig,
}

impl HttpGoogleAuthClient {
    pub fn new(cfg: GoogleConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }
}

#[async_trait]
impl GoogleAuthClient for HttpGoogleAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse, AppError> {
        let params = [
            ("code", code),
            ("client_id", self.cfg.client_id.as_str()),
            ("client_secret", self.cfg.client_secret.as_str()),
            ("redirect_uri", self.cfg.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "token exchange request failed");
                AppError::bad_request("Token exchange failed")
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "token exchange rejected");
            return Err(AppError::bad_request("Token exchange failed"));
        }

        response.json::<GoogleTokenResponse>().await.map_err(|err| {
            tracing::error!(error = %err, "token exchange returned invalid payload");
            AppError::bad_request("Token exchange failed")
        })
    }
}

/// Decodes the ID token's payload segment without checking the provider
/// signature. The token arrives over TLS from the same exchange response,
/// which is the trust boundary this flow relies on.
pub fn decode_id_token_payload(id_token: &str) -> Result<GoogleIdentity, AppError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::bad_request("Malformed ID token"))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::bad_request("Malformed ID token"))?;

    serde_json::from_slice(&bytes).map_err(|_| AppError::bad_request("Malformed ID token"))
}
