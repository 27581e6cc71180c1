//! Authentication and authorization for the docdesk control plane

pub mod jwt;
pub mod password;
pub mod policy;
pub mod token;

pub use jwt::{JwtError, JwtValidator, SessionClaims};
pub use password::{hash_password, verify_password, PasswordError};
pub use policy::{authorize, Action, Caller, Decision, DenyReason, Resource};
pub use token::{AccessTokenGenerator, TokenAlphabet, TokenError};

// Re-export useful types
pub use docdesk_db::entities::member::{MemberRole, MemberStatus};
