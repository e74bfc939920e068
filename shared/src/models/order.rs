//! Purchase order models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a purchase order
///
/// `Pending` orders have not touched material stock; a `Received` order has
/// credited its material exactly once. Receiving is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status")]
pub enum OrderStatus {
    Pending,
    Received,
}

/// A purchase order with vendor and material names resolved for display
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: Uuid,
    pub vendor: Option<String>,
    pub material: Option<String>,
    pub quantity: i32,
    pub cost_per_unit: Decimal,
    pub total_cost: Decimal,
    pub status: OrderStatus,
}
