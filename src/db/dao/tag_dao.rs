use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use uuid::Uuid;

use super::user_dao::like_escape;
use super::{DaoBase, DaoResult};
use crate::db::entities::prelude::TaskTag;
use crate::db::entities::task_tag;

#[derive(Clone)]
pub struct TagDao {
    db: DatabaseConnection,
}

impl DaoBase for TagDao {
    type Entity = TaskTag;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl TagDao {
    pub async fn create_tag(&self, name: &str, color: Option<&str>) -> DaoResult<task_tag::Model> {
        let model = task_tag::ActiveModel {
            name: Set(name.to_string()),
            color: Set(color.map(|c| c.to_string())),
            deleted_at: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    pub async fn find_by_name(&self, name: &str) -> DaoResult<Option<task_tag::Model>> {
        let name = name.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(task_tag::Column::Name.eq(name))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn list_live(&self, page: u64, page_size: u64) -> DaoResult<Vec<task_tag::Model>> {
        self.find(page, page_size, None, |query| {
            query.filter(task_tag::Column::DeletedAt.is_null())
        })
        .await
        .map(|response| response.data)
    }

    pub async fn search_by_name(&self, text: &str) -> DaoResult<Vec<task_tag::Model>> {
        let pattern = format!("%{}%", like_escape(text));
        self.find(1, Self::MAX_PAGE_SIZE, None, move |query| {
            query
                .filter(
                    Expr::col(task_tag::Column::Name)
                        .like(LikeExpr::new(pattern).escape('\\')),
                )
                .filter(task_tag::Column::DeletedAt.is_null())
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

    pub async fn restore(&self, id: &Uuid) -> DaoResult<task_tag::Model> {
        self.update(*id, |active| {
            active.deleted_at = Set(None);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use crate::db::entities::task_tag;

    use super::TagDao;
    use crate::db::dao::DaoBase;

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

    #[tokio::test]
    async fn find_by_name_returns_match() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[tag_model("backend")]])
            .into_connection();
        let dao = TagDao::new(&db);

        let tag = dao
            .find_by_name("backend")
            .await
            .expect("query should succeed")
            .expect("tag should exist");
        assert_eq!(tag.name, "backend");
    }

    #[tokio::test]
    async fn search_by_name_returns_live_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[tag_model("backend"), tag_model("backlog")]])
            .into_connection();
        let dao = TagDao::new(&db);

        let tags = dao
            .search_by_name("back")
            .await
            .expect("query should succeed");
        assert_eq!(tags.len(), 2);
    }
}
