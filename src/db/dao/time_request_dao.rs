use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::db::entities::prelude::TimeRequest;
use crate::db::entities::time_request;

#[derive(Debug, Default, Clone)]
pub struct TimeRequestFilter {
    pub created_by: Option<Uuid>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct TimeRequestDao {
    db: DatabaseConnection,
}

impl DaoBase for TimeRequestDao {
    type Entity = TimeRequest;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TimeRequestDao {
    pub async fn create_request(
        &self,
        created_by: &Uuid,
        kind: &str,
        reason: &str,
        minutes: Option<i32>,
        date: &DateTime<FixedOffset>,
    ) -> DaoResult<time_request::Model> {
        let model = time_request::ActiveModel {
            created_by: Set(*created_by),
            kind: Set(kind.to_string()),
            reason: Set(reason.to_string()),
            minutes: Set(minutes),
            date: Set(*date),
            status: Set("pending".to_string()),
            reviewed_by: Set(None),
            reviewed_at: Set(None),
            deleted_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn list(
        &self,
        page: u64,
        page_size: u64,
        filter: TimeRequestFilter,
    ) -> DaoResult<PaginatedResponse<time_request::Model>> {
        self.find_counted(page, page_size, None, move |query| {
            let mut query = query.filter(time_request::Column::DeletedAt.is_null());
            if let Some(created_by) = filter.created_by {
                query = query.filter(time_request::Column::CreatedBy.eq(created_by));
            }
            if let Some(kind) = filter.kind.as_ref() {
                query = query.filter(time_request::Column::Kind.eq(kind.clone()));
            }
            if let Some(status) = filter.status.as_ref() {
                query = query.filter(time_request::Column::Status.eq(status.clone()));
            }
            query
        })
        .await
    }

    pub async fn review(
        &self,
        id: &Uuid,
        status: &str,
        reviewer: &Uuid,
        now: &DateTime<FixedOffset>,
    ) -> DaoResult<time_request::Model> {
        let status = status.to_string();
        let reviewer = *reviewer;
        let now = *now;
        self.update(*id, move |active| {
            active.status = Set(status);
            active.reviewed_by = Set(Some(reviewer));
            active.reviewed_at = Set(Some(now));
        })
        .await
    }

    pub async fn soft_delete(&self, id: &Uuid, now: &DateTime<FixedOffset>) -> DaoResult<()> {
        let now = *now;
        self.update(*id, move |active| {
            active.deleted_at = Set(Some(now));
        })
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::entities::time_request;

    use super::{TimeRequestDao, TimeRequestFilter};
    use crate::db::dao::DaoBase;

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn request_model(created_by: Uuid, kind: &str, status: &str) -> time_request::Model {
        let now = ts();
        time_request::Model {
            id: Uuid::new_v4(),
            created_by,
            kind: kind.to_string(),
            reason: "overtime for the release".to_string(),
            minutes: Some(120),
            date: now,
            status: status.to_string(),
            reviewed_by: None,
            reviewed_at: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        std::collections::BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[tokio::test]
    async fn list_filters_by_creator() {
        let created_by = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .append_query_results([[request_model(created_by, "overtime", "pending")]])
            .into_connection();
        let dao = TimeRequestDao::new(&db);

        let response = dao
            .list(
                1,
                20,
                TimeRequestFilter {
                    created_by: Some(created_by),
                    ..Default::default()
                },
            )
            .await
            .expect("query should succeed");
        assert_eq!(response.total, Some(1));
        assert_eq!(response.data[0].created_by, created_by);
    }

    #[tokio::test]
    async fn review_stamps_reviewer_and_timestamp() {
        let reviewer = Uuid::new_v4();
        let pending = request_model(Uuid::new_v4(), "overtime", "pending");
        let mut approved = pending.clone();
        approved.status = "approved".to_string();
        approved.reviewed_by = Some(reviewer);
        approved.reviewed_at = Some(ts());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()], vec![approved]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let dao = TimeRequestDao::new(&db);

        let reviewed = dao
            .review(&pending.id, "approved", &reviewer, &ts())
            .await
            .expect("review should succeed");
        assert_eq!(reviewed.status, "approved");
        assert_eq!(reviewed.reviewed_by, Some(reviewer));
    }
}
