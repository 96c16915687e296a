pub mod context;
pub mod role_service;
pub mod sprint_service;
pub mod tag_service;
pub mod task_service;
pub mod time_request_service;
pub mod user_service;

pub use context::ServiceContext;
