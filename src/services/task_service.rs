use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::dao::{DaoBase, DaoLayerError, PaginatedResponse, SprintDao, TaskDao, TaskSearch},
    db::entities::task,
    error::AppError,
};

const TASK_STATUSES: &[&str] = &[
    "new",
    "in_progress",
    "completed",
    "archived",
    "canceled",
    "reviewing",
];
const TASK_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

fn parse_status(value: &str) -> Result<&str, AppError> {
    TASK_STATUSES
        .iter()
        .find(|candidate| **candidate == value)
        .copied()
        .ok_or_else(|| AppError::bad_request("Invalid task status"))
}

fn parse_priority(value: &str) -> Result<&str, AppError> {
    TASK_PRIORITIES
        .iter()
        .find(|candidate| **candidate == value)
        .copied()
        .ok_or_else(|| AppError::bad_request("Invalid task priority"))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub sprint_id: Uuid,
    pub parent_task_id: Option<Uuid>,
    #[serde(default)]
    pub priority: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::FixedOffset>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Clone)]
pub struct TaskService {
    task_dao: TaskDao,
    sprint_dao: SprintDao,
}

impl TaskService {
    pub fn new(task_dao: TaskDao, sprint_dao: SprintDao) -> Self {
        Self {
            task_dao,
            sprint_dao,
        }
    }

    pub async fn create(
        &self,
        author: &Uuid,
        input: CreateTaskInput,
    ) -> Result<task::Model, AppError> {
        if input.title.trim().is_empty() {
            return Err(AppError::bad_request("Title must not be empty"));
        }
        let priority = match input.priority.as_deref() {
            Some(priority) => parse_priority(priority)?.to_string(),
            None => "medium".to_string(),
        };

        let sprint = self
            .sprint_dao
            .find_by_id(input.sprint_id)
            .await
            .map_err(|err| match err {
                DaoLayerError::NotFound { .. } => AppError::not_found("Sprint not found"),
                err => err.into(),
            })?;
        if sprint.deleted_at.is_some() {
            return Err(AppError::not_found("Sprint not found"));
        }

        if let Some(parent_id) = input.parent_task_id.as_ref() {
            let parent = self.get(parent_id).await?;
            if parent.parent_task_id.is_some() {
                return Err(AppError::bad_request("Subtasks cannot be nested"));
            }
        }

        let model = task::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            sprint_id: Set(input.sprint_id),
            parent_task_id: Set(input.parent_task_id),
            status: Set("new".to_string()),
            priority: Set(priority),
            created_by: Set(*author),
            assigned_to: Set(input.assigned_to),
            due_date: Set(input.due_date),
            completed_at: Set(None),
            deleted_at: Set(None),
            tags: Set(serde_json::json!(input.tags)),
            ..Default::default()
        };
        Ok(self.task_dao.create(model).await?)
    }

    pub async fn get(&self, id: &Uuid) -> Result<task::Model, AppError> {
        let model = self.task_dao.find_by_id(*id).await.map_err(|err| match err {
            DaoLayerError::NotFound { .. } => AppError::not_found("Task not found"),
            err => err.into(),
        })?;
        if model.deleted_at.is_some() {
            return Err(AppError::not_found("Task not found"));
        }
        Ok(model)
    }

    /// Only the creator may edit. Completion stamps completed_at; moving
    /// out of completed clears it again.
    pub async fn update(
        &self,
        author: &Uuid,
        id: &Uuid,
        input: UpdateTaskInput,
    ) -> Result<task::Model, AppError> {
        let existing = self.get(id).await?;
        if existing.created_by != *author {
            return Err(AppError::forbidden("Not the task owner"));
        }

        let status = match input.status.as_deref() {
            Some(status) => Some(parse_status(status)?.to_string()),
            None => None,
        };
        let priority = match input.priority.as_deref() {
            Some(priority) => Some(parse_priority(priority)?.to_string()),
            None => None,
        };

        let was_completed = existing.status == "completed";
        let now = Utc::now().fixed_offset();
        Ok(self
            .task_dao
            .update(*id, move |active| {
                if let Some(title) = input.title {
                    active.title = Set(title);
                }
                if input.description.is_some() {
                    active.description = Set(input.description);
                }
                if let Some(status) = status {
                    if status == "completed" && !was_completed {
                        active.completed_at = Set(Some(now));
                    } else if status != "completed" {
                        active.completed_at = Set(None);
                    }
                    active.status = Set(status);
                }
                if let Some(priority) = priority {
                    active.priority = Set(priority);
                }
                if input.due_date.is_some() {
                    active.due_date = Set(input.due_date);
                }
                if let Some(tags) = input.tags {
                    active.tags = Set(serde_json::json!(tags));
                }
            })
            .await?)
    }

    pub async fn delete(&self, author: &Uuid, id: &Uuid) -> Result<(), AppError> {
        let existing = self.get(id).await?;
        if existing.created_by != *author {
            return Err(AppError::forbidden("Not the task owner"));
        }
        let now = Utc::now().fixed_offset();
        Ok(self.task_dao.soft_delete(id, &now).await?)
    }

    pub async fn assign(&self, id: &Uuid, assignee: Option<Uuid>) -> Result<task::Model, AppError> {
        self.get(id).await?;
        Ok(self
            .task_dao
            .update(*id, move |active| {
                active.assigned_to = Set(assignee);
            })
            .await?)
    }

    pub async fn subtasks(&self, id: &Uuid) -> Result<Vec<task::Model>, AppError> {
        self.get(id).await?;
        Ok(self.task_dao.subtasks(id).await?)
    }

    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        filters: TaskSearch,
    ) -> Result<PaginatedResponse<task::Model>, AppError> {
        if let Some(status) = filters.status.as_deref() {
            parse_status(status)?;
        }
        if let Some(priority) = filters.priority.as_deref() {
            parse_priority(priority)?;
        }
        Ok(self.task_dao.search(page, page_size, filters).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::dao::DaoBase;
    use crate::db::entities::{sprint, task};
    use crate::error::AppError;

    use super::{CreateTaskInput, TaskService, UpdateTaskInput};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn sprint_model(id: Uuid) -> sprint::Model {
        let now = ts();
        sprint::Model {
            id,
            name: "Sprint 12".to_string(),
            start_date: now,
            end_date: now + Duration::days(14),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn task_model(id: Uuid, created_by: Uuid, parent: Option<Uuid>) -> task::Model {
        let now = ts();
        task::Model {
            id,
            title: "Write release notes".to_string(),
            description: None,
            sprint_id: Uuid::new_v4(),
            parent_task_id: parent,
            status: "new".to_string(),
            priority: "medium".to_string(),
            created_by,
            assigned_to: None,
            due_date: None,
            completed_at: None,
            deleted_at: None,
            tags: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService::new(DaoBase::new(db), DaoBase::new(db))
    }

    fn create_input(sprint_id: Uuid, parent: Option<Uuid>) -> CreateTaskInput {
        CreateTaskInput {
            title: "Write release notes".to_string(),
            description: None,
            sprint_id,
            parent_task_id: parent,
            priority: None,
            assigned_to: None,
            due_date: None,
            tags: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_rejects_nested_subtasks() {
        let sprint_id = Uuid::new_v4();
        let parent_id = Uuid::new_v4();
        // parent already has a parent of its own
        let parent = task_model(parent_id, Uuid::new_v4(), Some(Uuid::new_v4()));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sprint_model(sprint_id)]])
            .append_query_results([vec![parent]])
            .into_connection();
        let service = service(&db);

        let err = service
            .create(&Uuid::new_v4(), create_input(sprint_id, Some(parent_id)))
            .await
            .expect_err("create should fail");
        assert_eq!(err.message(), "Subtasks cannot be nested");
    }

    #[tokio::test]
    async fn update_denies_non_owner() {
        let task_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![task_model(task_id, owner, None)]])
            .into_connection();
        let service = service(&db);

        let err = service
            .update(&Uuid::new_v4(), &task_id, UpdateTaskInput::default())
            .await
            .expect_err("update should fail");
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn completing_a_task_stamps_completed_at() {
        let task_id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let existing = task_model(task_id, owner, None);
        let mut completed = existing.clone();
        completed.status = "completed".to_string();
        completed.completed_at = Some(ts());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![existing.clone()],
                vec![existing],
                vec![completed],
            ])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let service = service(&db);

        let updated = service
            .update(
                &owner,
                &task_id,
                UpdateTaskInput {
                    status: Some("completed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .expect("update should succeed");
        assert_eq!(updated.status, "completed");
        assert!(updated.completed_at.is_some());
    }

    #[tokio::test]
    async fn get_hides_soft_deleted_tasks() {
        let task_id = Uuid::new_v4();
        let mut deleted = task_model(task_id, Uuid::new_v4(), None);
        deleted.deleted_at = Some(ts());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![deleted]])
            .into_connection();
        let service = service(&db);

        let err = service.get(&task_id).await.expect_err("get should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
