use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub sprint_id: Uuid,
    /// Subtasks nest one level only; a task with a parent cannot itself
    /// be a parent.
    pub parent_task_id: Option<Uuid>,
    pub status: String,
    pub priority: String,
    #[sea_orm(indexed)]
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub tags: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(belongs_to, from = "sprint_id", to = "id", on_delete = "Cascade")]
    pub sprint: HasOne<super::sprint::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
