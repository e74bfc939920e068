//! Database models for the inventory management platform
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
