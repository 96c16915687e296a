use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    auth::google::{GoogleIdentity, GoogleTokenResponse},
    db::dao::{DaoBase, DaoLayerError, PaginatedResponse, UserDao},
    db::entities::prelude::{OauthAccount, User},
    db::entities::{oauth_account, user},
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Pending,
    Active,
    Rejected,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Rejected => "rejected",
            UserStatus::Suspended => "suspended",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(UserStatus::Pending),
            "active" => Ok(UserStatus::Active),
            "rejected" => Ok(UserStatus::Rejected),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(AppError::bad_request("Invalid user status")),
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    user_dao: UserDao,
}

impl UserService {
    pub fn new(db: &DatabaseConnection, user_dao: UserDao) -> Self {
        Self {
            db: db.clone(),
            user_dao,
        }
    }

    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<user::Model>, AppError> {
        match self.user_dao.find_by_id(*id).await {
            Ok(model) => Ok(Some(model)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, AppError> {
        Ok(self.user_dao.find_by_email(email).await?)
    }

    /// Creates or refreshes the user and its Google account link in one
    /// transaction. Either both rows land or neither does; a failed login
    /// must not leave a half-linked user behind.
    pub async fn upsert_google_user(
        &self,
        identity: &GoogleIdentity,
        tokens: &GoogleTokenResponse,
        now: &DateTime<FixedOffset>,
    ) -> Result<user::Model, AppError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;

        let email = identity.email.to_lowercase();
        let existing = User::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(&txn)
            .await
            .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;

        let user_model = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                if identity.name.is_some() {
                    active.name = Set(identity.name.clone());
                }
                if identity.picture.is_some() {
                    active.avatar_url = Set(identity.picture.clone());
                }
                active.consent_calendar = Set(tokens.grants_calendar());
                active.last_login_at = Set(Some(*now));
                active.updated_at = Set(*now);
                active
                    .update(&txn)
                    .await
                    .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?
            }
            None => user::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(email),
                name: Set(identity.name.clone()),
                avatar_url: Set(identity.picture.clone()),
                status: Set(UserStatus::Pending.as_str().to_string()),
                consent_calendar: Set(tokens.grants_calendar()),
                approved_by: Set(None),
                approved_at: Set(None),
                rejected_reason: Set(None),
                last_login_at: Set(Some(*now)),
                created_at: Set(*now),
                updated_at: Set(*now),
            }
            .insert(&txn)
            .await
            .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?,
        };

        let token_expires_at = tokens
            .expires_in
            .map(|secs| *now + Duration::seconds(secs));
        let account = OauthAccount::find()
            .filter(oauth_account::Column::ProviderAccountId.eq(identity.sub.clone()))
            .one(&txn)
            .await
            .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;

        match account {
            Some(model) => {
                let mut active = model.into_active_model();
                active.access_token = Set(Some(tokens.access_token.clone()));
                if tokens.refresh_token.is_some() {
                    active.refresh_token = Set(tokens.refresh_token.clone());
                }
                active.scope = Set(tokens.scope.clone());
                active.token_expires_at = Set(token_expires_at);
                active.updated_at = Set(*now);
                active
                    .update(&txn)
                    .await
                    .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;
            }
            None => {
                oauth_account::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_model.id),
                    provider: Set("google".to_string()),
                    provider_account_id: Set(identity.sub.clone()),
                    access_token: Set(Some(tokens.access_token.clone())),
                    refresh_token: Set(tokens.refresh_token.clone()),
                    scope: Set(tokens.scope.clone()),
                    token_expires_at: Set(token_expires_at),
                    created_at: Set(*now),
                    updated_at: Set(*now),
                }
                .insert(&txn)
                .await
                .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;
            }
        }

        txn.commit()
            .await
            .map_err(|err| AppError::internal(format!("Login transaction failed: {err}")))?;

        Ok(user_model)
    }

    pub async fn approve(&self, id: &Uuid, approver: &Uuid) -> Result<user::Model, AppError> {
        let approver = *approver;
        let now = Utc::now().fixed_offset();
        self.set_status(id, move |active| {
            active.status = Set(UserStatus::Active.as_str().to_string());
            active.approved_by = Set(Some(approver));
            active.approved_at = Set(Some(now));
            active.rejected_reason = Set(None);
        })
        .await
    }

    pub async fn reject(
        &self,
        id: &Uuid,
        approver: &Uuid,
        reason: Option<String>,
    ) -> Result<user::Model, AppError> {
        let approver = *approver;
        self.set_status(id, move |active| {
            active.status = Set(UserStatus::Rejected.as_str().to_string());
            active.approved_by = Set(Some(approver));
            active.rejected_reason = Set(reason);
        })
        .await
    }

    pub async fn suspend(&self, id: &Uuid) -> Result<user::Model, AppError> {
        self.set_status(id, |active| {
            active.status = Set(UserStatus::Suspended.as_str().to_string());
        })
        .await
    }

    async fn set_status<F>(&self, id: &Uuid, apply: F) -> Result<user::Model, AppError>
    where
        F: for<'a> FnOnce(&'a mut user::ActiveModel) + Send,
    {
        match self.user_dao.update(*id, apply).await {
            Ok(model) => Ok(model),
            Err(DaoLayerError::NotFound { .. }) => Err(AppError::not_found("User not found")),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn search(
        &self,
        page: u64,
        page_size: u64,
        text: Option<&str>,
        status: Option<&str>,
    ) -> Result<PaginatedResponse<user::Model>, AppError> {
        if let Some(status) = status {
            UserStatus::parse(status)?;
        }
        Ok(self.user_dao.search(page, page_size, text, status).await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
    use uuid::Uuid;

    use crate::auth::google::{GoogleIdentity, GoogleTokenResponse};
    use crate::db::dao::DaoBase;
    use crate::db::entities::user;
    use crate::error::AppError;

    use super::{UserService, UserStatus};

    fn ts() -> chrono::DateTime<chrono::FixedOffset> {
        FixedOffset::east_opt(0)
            .expect("offset should be valid")
            .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
            .single()
            .expect("timestamp should be valid")
    }

    fn identity(email: &str) -> GoogleIdentity {
        GoogleIdentity {
            sub: "google-sub-1".to_string(),
            email: email.to_string(),
            name: Some("Alice".to_string()),
            picture: None,
        }
    }

    fn tokens() -> GoogleTokenResponse {
        GoogleTokenResponse {
            access_token: "google-access".to_string(),
            refresh_token: Some("google-refresh".to_string()),
            id_token: "google-id".to_string(),
            expires_in: Some(3600),
            scope: Some("openid email".to_string()),
        }
    }

    fn user_model(id: Uuid, email: &str, status: UserStatus) -> user::Model {
        let now = ts();
        user::Model {
            id,
            email: email.to_string(),
            name: None,
            avatar_url: None,
            status: status.as_str().to_string(),
            consent_calendar: false,
            approved_by: None,
            approved_at: None,
            rejected_reason: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn service(db: &sea_orm::DatabaseConnection) -> UserService {
        UserService::new(db, DaoBase::new(db))
    }

    #[tokio::test]
    async fn upsert_fails_whole_login_when_account_write_fails() {
        let id = Uuid::new_v4();
        // user lookup succeeds, user update succeeds, oauth lookup returns
        // nothing, then the account insert blows up inside the transaction.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(id, "alice@example.com", UserStatus::Active)]])
            .append_query_results([vec![user_model(id, "alice@example.com", UserStatus::Active)]])
            .append_query_results([Vec::<crate::db::entities::oauth_account::Model>::new()])
            .append_query_errors([DbErr::Custom("insert failed".to_string())])
            .into_connection();
        let service = service(&db);

        let result = service
            .upsert_google_user(&identity("alice@example.com"), &tokens(), &ts())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn search_rejects_unknown_status_filter() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service(&db);

        let err = service
            .search(1, 20, None, Some("deleted"))
            .await
            .expect_err("search should fail");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn approve_maps_missing_user_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let service = service(&db);

        let err = service
            .approve(&Uuid::new_v4(), &Uuid::new_v4())
            .await
            .expect_err("approve should fail");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
