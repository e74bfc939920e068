//! Manufactured product models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A manufactured product
///
/// `quantity` counts produced-but-unsold units; it is credited by production
/// runs and debited by sales. `is_available` is the soft-delete flag:
/// unavailable products are hidden from listings and name resolution but keep
/// their row so historical productions and sales stay resolvable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub is_available: bool,
}

/// Reference to a raw material a product is built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMaterialRef {
    pub name: String,
}

/// A product with its raw material names resolved for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub raw_materials: Vec<RawMaterialRef>,
}
