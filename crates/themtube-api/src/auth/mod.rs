//! Bearer-token authentication: argon2 passwords, JWT issuance and the request guard.

pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::JwtService;
pub use middleware::auth_middleware;
pub use models::{AuthUser, Claims};
