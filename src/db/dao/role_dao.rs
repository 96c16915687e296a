use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::RoleAssignment;
use crate::db::entities::role_assignment;

#[derive(Clone)]
pub struct RoleDao {
    db: DatabaseConnection,
}

impl DaoBase for RoleDao {
    type Entity = RoleAssignment;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RoleDao {
    pub async fn find_by_user(&self, user_id: &Uuid) -> DaoResult<Option<role_assignment::Model>> {
        let user_id = *user_id;
        self.find(1, 1, None, move |query| {
            query.filter(role_assignment::Column::UserId.eq(user_id))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    /// Last write wins: an existing assignment is overwritten in place.
    pub async fn upsert(&self, user_id: &Uuid, role: &str) -> DaoResult<role_assignment::Model> {
        match self.find_by_user(user_id).await? {
            Some(existing) => {
                let role = role.to_string();
                self.update(existing.id, move |active| {
                    active.role = Set(role);
                })
                .await
            }
            None => {
                let model = role_assignment::ActiveModel {
                    user_id: Set(*user_id),
                    role: Set(role.to_string()),
                    ..Default::default()
                };
                self.create(model).await
            }
        }
    }

    pub async fn remove_by_user(&self, user_id: &Uuid) -> DaoResult<bool> {
        let result = RoleAssignment::delete_many()
            .filter(role_assignment::Column::UserId.eq(*user_id))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(result.rows_affected > 0)
    }
}
