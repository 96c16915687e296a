use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::SessionManager, config::AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub sessions: SessionManager,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection, sessions: SessionManager) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            sessions,
        })
    }
}
