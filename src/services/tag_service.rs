use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, TagDao},
    db::entities::task_tag,
    error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct CreateTagInput {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTagInput {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[derive(Clone)]
pub struct TagService {
    tag_dao: TagDao,
}

impl TagService {
    pub fn new(tag_dao: TagDao) -> Self {
        Self { tag_dao }
    }

    pub async fn create(&self, input: CreateTagInput) -> Result<task_tag::Model, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::bad_request("Name must not be empty"));
        }
        if self.tag_dao.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict("Tag name already exists"));
        }
        Ok(self
            .tag_dao
            .create_tag(&input.name, input.color.as_deref())
            .await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<task_tag::Model, AppError> {
        let model = self.tag_dao.find_by_id(*id).await.map_err(|err| match err {
            DaoLayerError::NotFound { .. } => AppError::not_found("Tag not found"),
            err => err.into(),
        })?;
        if model.deleted_at.is_some() {
            return Err(AppError::not_found("Tag not found"));
        }
        Ok(model)
    }

    pub async fn update(
        &self,
        id: &Uuid,
        input: UpdateTagInput,
    ) -> Result<task_tag::Model, AppError> {
        self.get(id).await?;
        if let Some(name) = input.name.as_ref() {
            if let Some(existing) = self.tag_dao.find_by_name(name).await? {
                if existing.id != *id {
                    return Err(AppError::conflict("Tag name already exists"));
                }
            }
        }
        Ok(self
            .tag_dao
            .update(*id, move |active| {
                if let Some(name) = input.name {
                    active.name = Set(name);
                }
                if input.color.is_some() {
                    active.color = Set(input.color);
                }
            })
            .await?)
    }

    pub async fn list(&self, page: u64, page_size: u64) -> Result<Vec<task_tag::Model>, AppError> {
        Ok(self.tag_dao.list_live(page, page_size).await?)
    }

    pub async fn search(&self, text: &str) -> Result<Vec<task_tag::Model>, AppError> {
        Ok(self.tag_dao.search_by_name(text).await?)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        self.get(id).await?;
        let now = Utc::now().fixed_offset();
        Ok(self.tag_dao.soft_delete(id, &now).await?)
    }

    pub async fn restore(&self, id: &Uuid) -> Result<task_tag::Model, AppError> {
        match self.tag_dao.restore(id).await {
            Ok(model) => Ok(model),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::not_found("Tag not found")),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::dao::DaoBase;
    use crate::db::entities::task_tag;
    use crate::error::AppError;

    use super::{CreateTagInput, TagService};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn tag_model(name: &str) -> task_tag::Model {
        let now = ts();
        task_tag::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: &sea_orm::DatabaseConnection) -> TagService {
        TagService::new(DaoBase::new(db))
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[tag_model("backend")]])
            .into_connection();
        let service = service(&db);

        let err = service
            .create(CreateTagInput {
                name: "backend".to_string(),
                color: None,
            })
            .await
            .expect_err("create should fail");
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service(&db);

        let err = service
            .create(CreateTagInput {
                name: "   ".to_string(),
                color: None,
            })
            .await
            .expect_err("create should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
