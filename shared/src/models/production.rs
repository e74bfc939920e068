//! Production run models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One raw material consumption requested for a production run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionMaterialInput {
    pub raw_material_name: String,
    pub quantity: Decimal,
}

/// A resolved raw material consumption on a stored production record
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionMaterial {
    pub raw_material_name: Option<String>,
    pub quantity: Decimal,
}

/// A production record with product and material names resolved for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionView {
    pub id: Uuid,
    pub product_name: Option<String>,
    pub no_of_units_produced: i32,
    pub quantity_of_raw_materials: Vec<ProductionMaterial>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Detail entry of an insufficient-stock rejection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientMaterial {
    pub raw_material_name: String,
    pub required_quantity: Decimal,
    pub available_stock: Decimal,
}
