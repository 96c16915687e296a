pub mod bootstrap;
pub mod google;
pub mod session;
pub mod token;
pub mod types;

pub use session::SessionManager;
pub use token::{ACCESS_TTL_SECS, AuthKeys, JwtKeys, REFRESH_TTL_SECS};
pub use types::{Claims, Role, TokenPair, TokenValidation};
