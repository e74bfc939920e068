//! Sales transaction models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// A sale with its product name and price resolved for display
///
/// `total_sale` follows the current product price when the product still
/// exists; the stored amount is used only when the reference dangles.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub id: Uuid,
    pub product_name: Option<String>,
    pub customer_name: String,
    pub no_of_units_sold: i32,
    pub price_per_unit: Option<Decimal>,
    pub total_sale: Decimal,
    pub created_at: DateTime<Utc>,
}
