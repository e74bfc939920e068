//! HTTP handlers for the inventory management platform

use serde::{Deserialize, Serialize};

mod auth;
mod material;
mod order;
mod product;
mod production;
mod sale;
mod vendor;

pub use auth::*;
pub use material::*;
pub use order::*;
pub use product::*;
pub use production::*;
pub use sale::*;
pub use vendor::*;

/// Query parameters for paginated listing endpoints
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Response carrying only a confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
