pub trait HasCreatedAtColumn: sea_orm::EntityTrait {
    fn created_at_column() -> Self::Column;
}

pub trait HasIdActiveModel {
    fn set_id(&mut self, id: uuid::Uuid);
}

pub trait TimestampedActiveModel {
    fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
    fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone);
}

/// Wires an entity module into the DAO base. Every entity carries explicit
/// id/created_at/updated_at columns, so the impls are mechanical.
macro_rules! impl_dao_entity {
    ($entity:ident) => {
        impl crate::db::dao::base_traits::HasCreatedAtColumn
            for crate::db::entities::$entity::Entity
        {
            fn created_at_column() -> crate::db::entities::$entity::Column {
                crate::db::entities::$entity::Column::CreatedAt
            }
        }

        impl crate::db::dao::base_traits::HasIdActiveModel
            for crate::db::entities::$entity::ActiveModel
        {
            fn set_id(&mut self, id: uuid::Uuid) {
                self.id = sea_orm::ActiveValue::Set(id);
            }
        }

        impl crate::db::dao::base_traits::TimestampedActiveModel
            for crate::db::entities::$entity::ActiveModel
        {
            fn set_created_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.created_at = sea_orm::ActiveValue::Set(ts);
            }

            fn set_updated_at(&mut self, ts: sea_orm::entity::prelude::DateTimeWithTimeZone) {
                self.updated_at = sea_orm::ActiveValue::Set(ts);
            }
        }
    };
}

impl_dao_entity!(oauth_account);
impl_dao_entity!(refresh_session);
impl_dao_entity!(role_assignment);
impl_dao_entity!(sprint);
impl_dao_entity!(task);
impl_dao_entity!(task_tag);
impl_dao_entity!(time_request);
impl_dao_entity!(user);
