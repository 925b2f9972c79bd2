//! Authentication and authorization module

pub mod authorization;
pub mod cookies;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use authorization::{check_admin, check_ownership, require_admin, require_place_owner};
pub use cookies::CookiePolicy;
pub use jwt::{Claims, JwtService, TokenError, TokenKind, TokenPair};
pub use middleware::{auth_middleware, authenticate, extract_token, AuthContext, Authenticated};
pub use password::PasswordHasher;
