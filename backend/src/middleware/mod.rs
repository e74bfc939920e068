//! Middleware for the inventory management platform

mod auth;

pub use auth::{auth_middleware, require_admin, AuthUser, CurrentUser};
