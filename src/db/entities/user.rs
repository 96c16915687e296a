use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    /// pending until a superadmin approves the account.
    pub status: String,
    pub consent_calendar: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejected_reason: Option<String>,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(has_many)]
    pub oauth_accounts: HasMany<super::oauth_account::Entity>,
    #[sea_orm(has_many)]
    pub refresh_sessions: HasMany<super::refresh_session::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
