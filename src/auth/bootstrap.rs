use std::sync::Arc;

use anyhow::Context;

use crate::{config::AppConfig, services::ServiceContext};

use super::{
    google::HttpGoogleAuthClient,
    session::SessionManager,
    token::AuthKeys,
};

pub fn build_session_manager(
    cfg: &AppConfig,
    services: &ServiceContext,
) -> anyhow::Result<SessionManager> {
    let auth_cfg = cfg.auth.as_ref().context("auth config is required")?;
    let google_cfg = cfg.google.as_ref().context("google config is required")?;

    let keys = AuthKeys::from_config(auth_cfg);
    let google = Arc::new(HttpGoogleAuthClient::new(google_cfg.clone()));

    Ok(SessionManager::new(
        services.user(),
        services.refresh_session_dao(),
        google,
        keys,
        google_cfg.frontend_callback_url.clone(),
    ))
}
