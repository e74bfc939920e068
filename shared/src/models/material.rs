//! Raw material models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw material tracked in the stock ledger
///
/// `stock` is the only mutable balance on the document. It is credited by
/// order receipts and debited by production runs; no other path writes it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub stock: Decimal,
    /// Unit of measurement (e.g. kg, liters)
    pub unit: String,
    /// Reorder level; listings rank materials below it first
    pub threshold: Decimal,
    pub description: Option<String>,
}
