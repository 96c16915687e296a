use sea_orm::DatabaseConnection;

use crate::{
    db::dao::{DaoContext, RefreshSessionDao},
    services::{
        role_service::RoleService, sprint_service::SprintService, tag_service::TagService,
        task_service::TaskService, time_request_service::TimeRequestService,
        user_service::UserService,
    },
    state::AppState,
};

#[derive(Clone)]
pub struct ServiceContext {
    db: DatabaseConnection,
    daos: DaoContext,
}

impl ServiceContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self {
            db: db.clone(),
            daos: DaoContext::new(db),
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(&state.db)
    }

    pub fn user(&self) -> UserService {
        UserService::new(&self.db, self.daos.user())
    }

    pub fn role(&self) -> RoleService {
        RoleService::new(self.daos.role())
    }

    pub fn task(&self) -> TaskService {
        TaskService::new(self.daos.task(), self.daos.sprint())
    }

    pub fn sprint(&self) -> SprintService {
        SprintService::new(self.daos.sprint())
    }

    pub fn tag(&self) -> TagService {
        TagService::new(self.daos.tag())
    }

    pub fn time_request(&self) -> TimeRequestService {
        TimeRequestService::new(self.daos.time_request())
    }

    pub fn refresh_session_dao(&self) -> RefreshSessionDao {
        self.daos.refresh_session()
    }
}
