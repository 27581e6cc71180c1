//! API Middleware
//!
//! Session authentication for the administrator endpoints.

pub mod auth;

pub use auth::{require_auth, JwtState, SessionMember};
