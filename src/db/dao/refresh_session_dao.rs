use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use super::{DaoBase, DaoLayerError, DaoResult};
use crate::db::entities::prelude::RefreshSession;
use crate::db::entities::refresh_session;

/// Lifecycle tag of a session row. Rotated and revoked are both terminal;
/// a closed session never validates again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Rotated,
    Revoked,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Rotated => "rotated",
            SessionStatus::Revoked => "revoked",
        }
    }
}

#[derive(Clone)]
pub struct RefreshSessionDao {
    db: DatabaseConnection,
}

impl DaoBase for RefreshSessionDao {
    type Entity = RefreshSession;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl RefreshSessionDao {
    pub async fn create_session(
        &self,
        user_id: &Uuid,
        token_id: &Uuid,
        token_hash: &str,
        issued_at: &DateTime<FixedOffset>,
        expires_at: &DateTime<FixedOffset>,
    ) -> DaoResult<refresh_session::Model> {
        let model = refresh_session::ActiveModel {
            user_id: Set(*user_id),
            token_id: Set(*token_id),
            token_hash: Set(token_hash.to_string()),
            status: Set(SessionStatus::Active.as_str().to_string()),
            issued_at: Set(*issued_at),
            expires_at: Set(*expires_at),
            revoked_at: Set(None),
            rotated_to: Set(None),
            ..Default::default()
        };
        self.create(model).await
    }

    /// Exact hash equality against active rows only. A rotated or revoked
    /// session never matches.
    pub async fn find_active_by_hash(
        &self,
        user_id: &Uuid,
        token_hash: &str,
    ) -> DaoResult<Option<refresh_session::Model>> {
        let user_id = *user_id;
        let token_hash = token_hash.to_string();
        self.find(1, 1, None, move |query| {
            query
                .filter(refresh_session::Column::UserId.eq(user_id))
                .filter(refresh_session::Column::TokenHash.eq(token_hash))
                .filter(refresh_session::Column::Status.eq(SessionStatus::Active.as_str()))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    /// Idempotent: only flips rows that are still active.
    pub async fn revoke(&self, id: &Uuid, now: &DateTime<FixedOffset>) -> DaoResult<()> {
        self.close_where(
            refresh_session::Column::Id.eq(*id),
            SessionStatus::Revoked,
            None,
            now,
        )
        .await
    }

    /// No-op when nothing active matches the hash.
    pub async fn revoke_by_hash(
        &self,
        token_hash: &str,
        now: &DateTime<FixedOffset>,
    ) -> DaoResult<()> {
        self.close_where(
            refresh_session::Column::TokenHash.eq(token_hash),
            SessionStatus::Revoked,
            None,
            now,
        )
        .await
    }

    /// Stamps the session rotated and records its successor's token_id.
    pub async fn mark_rotated(
        &self,
        id: &Uuid,
        successor_token_id: &Uuid,
        now: &DateTime<FixedOffset>,
    ) -> DaoResult<()> {
        self.close_where(
            refresh_session::Column::Id.eq(*id),
            SessionStatus::Rotated,
            Some(*successor_token_id),
            now,
        )
        .await
    }

    async fn close_where(
        &self,
        condition: sea_orm::sea_query::SimpleExpr,
        status: SessionStatus,
        rotated_to: Option<Uuid>,
        now: &DateTime<FixedOffset>,
    ) -> DaoResult<()> {
        RefreshSession::update_many()
            .col_expr(refresh_session::Column::Status, Expr::value(status.as_str()))
            .col_expr(refresh_session::Column::RevokedAt, Expr::value(Some(*now)))
            .col_expr(refresh_session::Column::RotatedTo, Expr::value(rotated_to))
            .col_expr(refresh_session::Column::UpdatedAt, Expr::value(*now))
            .filter(condition)
            .filter(refresh_session::Column::Status.eq(SessionStatus::Active.as_str()))
            .exec(&self.db)
            .await
            .map_err(DaoLayerError::Db)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};
    use uuid::Uuid;

    use crate::db::entities::refresh_session;

    use super::{RefreshSessionDao, SessionStatus};
    use crate::db::dao::{DaoBase, DaoLayerError};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn session_model(user_id: Uuid, hash: &str, status: SessionStatus) -> refresh_session::Model {
        let now = ts();
        refresh_session::Model {
            id: Uuid::new_v4(),
            user_id,
            token_id: Uuid::new_v4(),
            token_hash: hash.to_string(),
            status: status.as_str().to_string(),
            issued_at: now,
            expires_at: now + Duration::days(30),
            revoked_at: None,
            rotated_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn find_active_by_hash_returns_match() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[session_model(user_id, "hash-1", SessionStatus::Active)]])
            .into_connection();
        let dao = RefreshSessionDao::new(&db);

        let session = dao
            .find_active_by_hash(&user_id, "hash-1")
            .await
            .expect("query should succeed")
            .expect("session should exist");
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.status, "active");
    }

    #[tokio::test]
    async fn find_active_by_hash_returns_none_when_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<refresh_session::Model>::new()])
            .into_connection();
        let dao = RefreshSessionDao::new(&db);

        let result = dao
            .find_active_by_hash(&Uuid::new_v4(), "no-such-hash")
            .await
            .expect("query should succeed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn revoke_succeeds_when_nothing_matches() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();
        let dao = RefreshSessionDao::new(&db);

        dao.revoke_by_hash("already-gone", &ts())
            .await
            .expect("revoke should be a no-op");
    }

    #[tokio::test]
    async fn mark_rotated_maps_database_errors() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors([DbErr::Custom("update failed".to_string())])
            .into_connection();
        let dao = RefreshSessionDao::new(&db);

        let err = dao
            .mark_rotated(&Uuid::new_v4(), &Uuid::new_v4(), &ts())
            .await
            .expect_err("update should fail");
        assert!(matches!(err, DaoLayerError::Db(_)));
    }
}
