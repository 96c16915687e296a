use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, Set};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use uuid::Uuid;

use super::{DaoBase, DaoResult, PaginatedResponse};
use crate::db::entities::prelude::User;
use crate::db::entities::user;

#[derive(Clone)]
pub struct UserDao {
    db: DatabaseConnection,
}

impl DaoBase for UserDao {
    type Entity = User;

    fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl UserDao {
    pub async fn find_by_email(&self, email: &str) -> DaoResult<Option<user::Model>> {
        let email = email.to_string();
        self.find(1, 1, None, move |query| {
            query.filter(user::Column::Email.eq(email))
        })
        .await
        .map(|response| response.data.into_iter().next())
    }

    pub async fn set_last_login(
        &self,
        id: &Uuid,
        at: &chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<()> {
        let at = *at;
        self.update(*id, move |active| {
            active.last_login_at = Set(Some(at));
        })
        .await
        .map(|_| ())
    }

    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        text: Option<&str>,
        status: Option<&str>,
    ) -> DaoResult<PaginatedResponse<user::Model>> {
        let text = text.map(|t| t.to_string());
        let status = status.map(|s| s.to_string());

        self.find_counted(page, page_size, None, move |query| {
            let query = match text.as_ref() {
                Some(text) => {
                    let pattern = format!("%{}%", like_escape(text));
                    query.filter(
                        Expr::col(user::Column::Email)
                            .like(LikeExpr::new(pattern.clone()).escape('\\'))
                            .or(Expr::col(user::Column::Name)
                                .like(LikeExpr::new(pattern).escape('\\'))),
                    )
                }
                None => query,
            };
            match status.as_ref() {
                Some(status) => query.filter(user::Column::Status.eq(status.clone())),
                None => query,
            }
        })
        .await
    }
}

/// Escapes LIKE metacharacters so user input matches literally.
pub(crate) fn like_escape(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
