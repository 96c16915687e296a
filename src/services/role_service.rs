use uuid::Uuid;

use crate::{
    auth::Role,
    db::dao::RoleDao,
    error::AppError,
};

#[derive(Clone)]
pub struct RoleService {
    role_dao: RoleDao,
}

impl RoleService {
    pub fn new(role_dao: RoleDao) -> Self {
        Self { role_dao }
    }

    /// A user with no assignment has no role; callers decide the default.
    pub async fn get_role(&self, user_id: &Uuid) -> Result<Option<Role>, AppError> {
        let assignment = self.role_dao.find_by_user(user_id).await?;
        match assignment {
            Some(model) => Role::try_from(model.role.as_str())
                .map(Some)
                .map_err(|_| AppError::internal(format!("Unknown role value: {}", model.role))),
            None => Ok(None),
        }
    }

    pub async fn set_role(&self, user_id: &Uuid, role: &str) -> Result<Role, AppError> {
        let role =
            Role::try_from(role).map_err(|_| AppError::bad_request("Invalid role value"))?;
        self.role_dao.upsert(user_id, role.as_str()).await?;
        Ok(role)
    }

    pub async fn remove_role(&self, user_id: &Uuid) -> Result<bool, AppError> {
        Ok(self.role_dao.remove_by_user(user_id).await?)
    }
}
