use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, SprintDao},
    db::entities::sprint,
    error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct CreateSprintInput {
    pub name: String,
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
}

#[derive(Clone)]
pub struct SprintService {
    sprint_dao: SprintDao,
}

impl SprintService {
    pub fn new(sprint_dao: SprintDao) -> Self {
        Self { sprint_dao }
    }

    pub async fn create(&self, input: CreateSprintInput) -> Result<sprint::Model, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::bad_request("Name must not be empty"));
        }
        if input.start_date >= input.end_date {
            return Err(AppError::bad_request("Start date must be before end date"));
        }
        if self.sprint_dao.find_live_by_name(&input.name).await?.is_some() {
            return Err(AppError::conflict("Sprint name already exists"));
        }
        Ok(self
            .sprint_dao
            .create_sprint(&input.name, &input.start_date, &input.end_date)
            .await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<sprint::Model, AppError> {
        let model = self
            .sprint_dao
            .find_by_id(*id)
            .await
            .map_err(|err| match err {
                DaoLayerError::NotFound { .. } => AppError::not_found("Sprint not found"),
                err => err.into(),
            })?;
        if model.deleted_at.is_some() {
            return Err(AppError::not_found("Sprint not found"));
        }
        Ok(model)
    }

    pub async fn list(&self, page: u64, page_size: u64) -> Result<Vec<sprint::Model>, AppError> {
        Ok(self.sprint_dao.list_live(page, page_size).await?)
    }

    pub async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        self.get(id).await?;
        let now = Utc::now().fixed_offset();
        Ok(self.sprint_dao.soft_delete(id, &now).await?)
    }

    pub async fn restore(&self, id: &Uuid) -> Result<sprint::Model, AppError> {
        match self.sprint_dao.restore(id).await {
            Ok(model) => Ok(model),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::not_found("Sprint not found")),
            Err(err) => Err(err.into()),
        }
    }
}
