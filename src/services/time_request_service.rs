use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, PaginatedResponse, TimeRequestDao, TimeRequestFilter},
    db::entities::time_request,
    error::AppError,
};

const REQUEST_KINDS: &[&str] = &[
    "overtime",
    "day_off",
    "remote_work",
    "leave_early",
    "late_arrival",
];

fn parse_kind(value: &str) -> Result<&str, AppError> {
    REQUEST_KINDS
        .iter()
        .find(|candidate| **candidate == value)
        .copied()
        .ok_or_else(|| AppError::bad_request("Invalid time request kind"))
}

/// Day-off requests span whole days, so minutes are rejected for them and
/// required (positive) for every other kind.
fn validate_minutes(kind: &str, minutes: Option<i32>) -> Result<(), AppError> {
    if kind == "day_off" {
        if minutes.is_some() {
            return Err(AppError::bad_request(
                "Minutes are not allowed for day off requests",
            ));
        }
        return Ok(());
    }
    match minutes {
        Some(minutes) if minutes > 0 => Ok(()),
        _ => Err(AppError::bad_request("Minutes must be a positive number")),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTimeRequestInput {
    pub kind: String,
    pub reason: String,
    pub minutes: Option<i32>,
    pub date: DateTime<FixedOffset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTimeRequestInput {
    pub reason: Option<String>,
    pub minutes: Option<i32>,
    pub date: Option<DateTime<FixedOffset>>,
}

#[derive(Clone)]
pub struct TimeRequestService {
    request_dao: TimeRequestDao,
}

impl TimeRequestService {
    pub fn new(request_dao: TimeRequestDao) -> Self {
        Self { request_dao }
    }

    pub async fn create(
        &self,
        author: &Uuid,
        input: CreateTimeRequestInput,
    ) -> Result<time_request::Model, AppError> {
        let kind = parse_kind(&input.kind)?;
        validate_minutes(kind, input.minutes)?;
        if input.reason.trim().is_empty() {
            return Err(AppError::bad_request("Reason must not be empty"));
        }
        Ok(self
            .request_dao
            .create_request(author, kind, &input.reason, input.minutes, &input.date)
            .await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<time_request::Model, AppError> {
        let model = self
            .request_dao
            .find_by_id(*id)
            .await
            .map_err(|err| match err {
                DaoLayerError::NotFound { .. } => AppError::not_found("Time request not found"),
                err => err.into(),
            })?;
        if model.deleted_at.is_some() {
            return Err(AppError::not_found("Time request not found"));
        }
        Ok(model)
    }

    pub async fn update(
        &self,
        author: &Uuid,
        id: &Uuid,
        input: UpdateTimeRequestInput,
    ) -> Result<time_request::Model, AppError> {
        let existing = self.guard_own_pending(author, id).await?;
        if let Some(minutes) = input.minutes {
            validate_minutes(&existing.kind, Some(minutes))?;
        }
        Ok(self
            .request_dao
            .update(*id, move |active| {
                if let Some(reason) = input.reason {
                    active.reason = Set(reason);
                }
                if let Some(minutes) = input.minutes {
                    active.minutes = Set(Some(minutes));
                }
                if let Some(date) = input.date {
                    active.date = Set(date);
                }
            })
            .await?)
    }

    pub async fn delete(&self, author: &Uuid, id: &Uuid) -> Result<(), AppError> {
        self.guard_own_pending(author, id).await?;
        let now = Utc::now().fixed_offset();
        Ok(self.request_dao.soft_delete(id, &now).await?)
    }

    pub async fn list_own(
        &self,
        author: &Uuid,
        page: u64,
        page_size: u64,
    ) -> Result<PaginatedResponse<time_request::Model>, AppError> {
        Ok(self
            .request_dao
            .list(
                page,
                page_size,
                TimeRequestFilter {
                    created_by: Some(*author),
                    ..Default::default()
                },
            )
            .await?)
    }

    pub async fn list_all(
        &self,
        page: u64,
        page_size: u64,
        kind: Option<String>,
        status: Option<String>,
    ) -> Result<PaginatedResponse<time_request::Model>, AppError> {
        if let Some(kind) = kind.as_deref() {
            parse_kind(kind)?;
        }
        Ok(self
            .request_dao
            .list(
                page,
                page_size,
                TimeRequestFilter {
                    created_by: None,
                    kind,
                    status,
                },
            )
            .await?)
    }

    pub async fn review(
        &self,
        reviewer: &Uuid,
        id: &Uuid,
        approve: bool,
    ) -> Result<time_request::Model, AppError> {
        let existing = self.get(id).await?;
        if existing.status != "pending" {
            return Err(AppError::bad_request("Request already reviewed"));
        }
        let status = if approve { "approved" } else { "rejected" };
        let now = Utc::now().fixed_offset();
        Ok(self.request_dao.review(id, status, reviewer, &now).await?)
    }

    async fn guard_own_pending(
        &self,
        author: &Uuid,
        id: &Uuid,
    ) -> Result<time_request::Model, AppError> {
        let existing = self.get(id).await?;
        if existing.created_by != *author {
            return Err(AppError::forbidden("Not the request owner"));
        }
        if existing.status != "pending" {
            return Err(AppError::bad_request(
                "Only pending requests can be changed",
            ));
        }
        Ok(existing)
    }
}
