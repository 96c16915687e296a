pub mod base;
pub mod base_traits;
mod context;
pub mod error;
pub mod refresh_session_dao;
pub mod role_dao;
pub mod sprint_dao;
pub mod tag_dao;
pub mod task_dao;
pub mod time_request_dao;
pub mod user_dao;

pub use base::{DaoBase, PaginatedResponse};
pub use base_traits::{HasCreatedAtColumn, HasIdActiveModel, TimestampedActiveModel};
pub use context::DaoContext;
pub use error::{DaoLayerError, DaoResult};
pub use refresh_session_dao::{RefreshSessionDao, SessionStatus};
pub use role_dao::RoleDao;
pub use sprint_dao::SprintDao;
pub use tag_dao::TagDao;
pub use task_dao::{TaskDao, TaskSearch};
pub use time_request_dao::{TimeRequestDao, TimeRequestFilter};
pub use user_dao::UserDao;
