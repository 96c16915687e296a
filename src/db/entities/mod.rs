#[allow(unused_imports)]
pub mod prelude {
    pub use super::oauth_account::Entity as OauthAccount;
    pub use super::refresh_session::Entity as RefreshSession;
    pub use super::role_assignment::Entity as RoleAssignment;
    pub use super::sprint::Entity as Sprint;
    pub use super::task::Entity as Task;
    pub use super::task_tag::Entity as TaskTag;
    pub use super::time_request::Entity as TimeRequest;
    pub use super::user::Entity as User;
}

pub mod oauth_account;
pub mod refresh_session;
pub mod role_assignment;
pub mod sprint;
pub mod task;
pub mod task_tag;
pub mod time_request;
pub mod user;
