pub mod auth;
pub mod public;
pub mod roles;
mod router;
pub mod sprints;
pub mod tags;
pub mod tasks;
pub mod time_requests;
pub mod users;

pub use router::router;

use crate::auth::Role;

pub(crate) const SUPERADMIN: &[Role] = &[Role::Superadmin];
pub(crate) const ADMINS: &[Role] = &[Role::Admin, Role::Superadmin];
