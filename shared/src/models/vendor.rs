//! Vendor catalog models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A vendor supplying raw materials
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub email: String,
    pub address: String,
}

/// One priced material entry in a vendor's catalog
///
/// A vendor may carry the same material more than once at different prices;
/// entries are kept in insertion order and order pricing takes the first
/// match.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMaterialEntry {
    pub material_name: Option<String>,
    pub cost_per_unit: Decimal,
}

/// A vendor with its catalog entries resolved for display
#[derive(Debug, Clone, Serialize)]
pub struct VendorView {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub materials: Vec<VendorMaterialEntry>,
}
