use sea_orm::DatabaseConnection;

use super::{
    DaoBase, RefreshSessionDao, RoleDao, SprintDao, TagDao, TaskDao, TimeRequestDao, UserDao,
};

#[derive(Clone)]
pub struct DaoContext {
    db: DatabaseConnection,
}

impl DaoContext {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    pub fn user(&self) -> UserDao {
        DaoBase::new(&self.db)
    }

    pub fn refresh_session(&self) -> RefreshSessionDao {
        DaoBase::new(&self.db)
    }

    pub fn role(&self) -> RoleDao {
        DaoBase::new(&self.db)
    }

    pub fn task(&self) -> TaskDao {
        DaoBase::new(&self.db)
    }

    pub fn sprint(&self) -> SprintDao {
        DaoBase::new(&self.db)
    }

    pub fn tag(&self) -> TagDao {
        DaoBase::new(&self.db)
    }

    pub fn time_request(&self) -> TimeRequestDao {
        DaoBase::new(&self.db)
    }
}
