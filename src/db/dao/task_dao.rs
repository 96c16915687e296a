use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use uuid::Uuid;

use super::user_dao::like_escape;
use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::db::entities::prelude::Task;
use crate::db::entities::task;

/// Filter set for the task search endpoint. Top-level tasks only; subtasks
/// are reached through their parent.
#[derive(Debug, Default, Clone)]
pub struct TaskSearch {
    pub sprint_id: Option<Uuid>,
    pub text: Option<String>,
    pub created_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub include_deleted: bool,
}

#[derive(Clone)]
pub struct TaskDao {
    db: DatabaseConnection,
}

impl DaoBase for TaskDao {
    type Entity = Task;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TaskDao {
    pub async fn subtasks(&self, parent_id: &Uuid) -> DaoResult<Vec<task::Model>> {
        let parent_id = *parent_id;
        self.find(1, Self::MAX_PAGE_SIZE, None, move |query| {
            query
                .filter(task::Column::ParentTaskId.eq(parent_id))
                .filter(task::Column::DeletedAt.is_null())
        })
        .await
        .map(|response| response.data)
    }

    pub async fn soft_delete(&self, id: &Uuid, now: &DateTime<FixedOffset>) -> DaoResult<()> {
        let now = *now;
        self.update(*id, move |active| {
            active.deleted_at = Set(Some(now));
        })
        .await
        .map(|_| ())
    }

    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        filters: TaskSearch,
    ) -> DaoResult<PaginatedResponse<task::Model>> {
        self.find_counted(page, page_size, None, move |query| {
            let mut query = query.filter(task::Column::ParentTaskId.is_null());
            if !filters.include_deleted {
                query = query.filter(task::Column::DeletedAt.is_null());
            }
            if let Some(sprint_id) = filters.sprint_id {
                query = query.filter(task::Column::SprintId.eq(sprint_id));
            }
            if let Some(text) = filters.text.as_ref() {
                let pattern = format!("%{}%", like_escape(text));
                query = query.filter(
                    Expr::col(task::Column::Title)
                        .like(LikeExpr::new(pattern.clone()).escape('\\'))
                        .or(Expr::col(task::Column::Description)
                            .like(LikeExpr::new(pattern).escape('\\'))),
                );
            }
            if let Some(created_by) = filters.created_by {
                query = query.filter(task::Column::CreatedBy.eq(created_by));
            }
            if let Some(assigned_to) = filters.assigned_to {
                query = query.filter(task::Column::AssignedTo.eq(assigned_to));
            }
            if let Some(priority) = filters.priority.as_ref() {
                query = query.filter(task::Column::Priority.eq(priority.clone()));
            }
            if let Some(status) = filters.status.as_ref() {
                query = query.filter(task::Column::Status.eq(status.clone()));
            }
            if let Some(tag) = filters.tag.as_ref() {
                // tags is a json array of strings; a quoted-substring match
                // against its text form is portable across backends.
                let pattern = format!("%\"{}\"%", like_escape(tag));
                query = query.filter(
                    Expr::cust_with_values("CAST(tags AS TEXT) LIKE ?", [pattern]),
                );
            }
            query
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::task;

    use super::{TaskDao, TaskSearch};
    use crate::db::dao::DaoBase;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn task_model(title: &str, sprint_id: Uuid) -> task::Model {
        let now = ts();
        task::Model {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            sprint_id,
            parent_task_id: None,
            status: "new".to_string(),
            priority: "medium".to_string(),
            created_by: Uuid::new_v4(),
            assigned_to: None,
            due_date: None,
            completed_at: None,
            deleted_at: None,
            tags: serde_json::json!([]),
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[tokio::test]
    async fn search_reports_totals() {
        let sprint_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .append_query_results([[task_model("Write release notes", sprint_id)]])
            .into_connection();
        let dao = TaskDao::new(&db);

        let response = dao
            .search(
                1,
                20,
                TaskSearch {
                    sprint_id: Some(sprint_id),
                    ..Default::default()
                },
            )
            .await
            .expect("search should succeed");
        assert_eq!(response.total, Some(1));
        assert_eq!(response.total_pages(), Some(1));
        assert_eq!(response.data.len(), 1);
    }

    #[tokio::test]
    async fn subtasks_excludes_soft_deleted_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<task::Model>::new()])
            .into_connection();
        let dao = TaskDao::new(&db);

        let subtasks = dao
            .subtasks(&Uuid::new_v4())
            .await
            .expect("query should succeed");
        assert!(subtasks.is_empty());
    }
}
