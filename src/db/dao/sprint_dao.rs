use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

use super::{DaoBase, DaoResult};
use crate::db::entities::prelude::Sprint;
use crate::db::entities::sprint;

#[derive(Clone)]
pub struct SprintDao {
    db: DatabaseConnection,
}

impl DaoBase for SprintDao {
    type Entity = Sprint;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl SprintDao {
    pub async fn create_sprint(
        &self,
        name: &str,
        start_date: &DateTime<FixedOffset>,
        end_date: &DateTime<FixedOffset>,
    ) -> DaoResult<sprint::Model> {
        let model = sprint::ActiveModel {
            name: Set(name.to_string()),
            start_date: Set(*start_date),
            end_date: Set(*end_date),
            deleted_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Name lookup among live sprints, for the uniqueness check.
    pub async fn find_live_by_name(&self, name: &str) -> DaoResult<Option<sprint::Model>> {
        let name = name.to_string();
        self.find(1, 1, None, move |query| {
            query
                .filter(sprint::Column::Name.eq(name))
                .filter(sprint::Column::DeletedAt.is_null())
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn list_live(&self, page: u64, page_size: u64) -> DaoResult<Vec<sprint::Model>> {
        self.find(page, page_size, None, |query| {
            query.filter(sprint::Column::DeletedAt.is_null())
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

    pub async fn restore(&self, id: &Uuid) -> DaoResult<sprint::Model> {
        self.update(*id, |active| {
            active.deleted_at = Set(None);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::sprint;

    use super::SprintDao;
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn sprint_model(name: &str) -> sprint::Model {
        let now = ts();
        sprint::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            start_date: now,
            end_date: now + Duration::days(14),
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_live_by_name_returns_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[sprint_model("Sprint 12")]])
            .into_connection();
        let dao = SprintDao::new(&db);

        let sprint = dao
            .find_live_by_name("Sprint 12")
            .await
            .expect("query should succeed")
            .expect("sprint should exist");
        assert_eq!(sprint.name, "Sprint 12");
    }

    #[tokio::test]
    async fn restore_propagates_not_found() {
        let missing_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<sprint::Model>::new()])
            .into_connection();
        let dao = SprintDao::new(&db);

        let err = dao
            .restore(&missing_id)
            .await
            .expect_err("update should fail");
        assert!(matches!(
            err,
            DaoLayerError::NotFound { id, .. } if id == missing_id
        ));
    }
}
