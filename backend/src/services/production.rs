//! Production workflow
//!
//! A production run converts raw material stock into product stock: every
//! named material is debited and the product's quantity is credited, with
//! the record keeping enough detail to reverse the run later. Editing
//! reverts the old run and applies the new one; deleting reverts and
//! removes. Each operation runs in a single transaction with the touched
//! ledger rows locked, so partial state is never committed and concurrent
//! runs against the same materials serialize.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    InsufficientMaterial, ProductionMaterial, ProductionMaterialInput, ProductionView,
};
use shared::types::{page_offset, PAGE_SIZE};

/// Service for production records and their stock effects
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// Input for creating or editing a production run
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionInput {
    pub product_name: String,
    pub no_of_units_produced: i32,
    pub quantity_of_raw_materials: Vec<ProductionMaterialInput>,
}

/// A raw material's identity and current balance, as locked inside a workflow
#[derive(Debug, Clone, sqlx::FromRow)]
struct MaterialStock {
    id: Uuid,
    name: String,
    stock: Decimal,
}

/// Production record header row
#[derive(Debug, sqlx::FromRow)]
struct ProductionRow {
    id: Uuid,
    product_name: Option<String>,
    no_of_units_produced: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

const PRODUCTION_ROW_QUERY: &str = r#"
SELECT p.id, pr.name AS product_name, p.no_of_units_produced, p.created_at, p.updated_at
FROM productions p
LEFT JOIN products pr ON pr.id = p.product_id
"#;

/// Requested material names that are not among the product's raw materials
fn invalid_materials(
    requested: &[ProductionMaterialInput],
    known: &[MaterialStock],
) -> Vec<String> {
    requested
        .iter()
        .filter(|item| !known.iter().any(|m| m.name == item.raw_material_name))
        .map(|item| item.raw_material_name.clone())
        .collect()
}

/// Requested consumptions the current balances cannot cover
fn insufficient_materials(
    requested: &[ProductionMaterialInput],
    known: &[MaterialStock],
) -> Vec<InsufficientMaterial> {
    requested
        .iter()
        .filter_map(|item| {
            let material = known.iter().find(|m| m.name == item.raw_material_name)?;
            if material.stock < item.quantity {
                Some(InsufficientMaterial {
                    raw_material_name: item.raw_material_name.clone(),
                    required_quantity: item.quantity,
                    available_stock: material.stock,
                })
            } else {
                None
            }
        })
        .collect()
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a production run, debiting materials and crediting the product
    pub async fn create(&self, input: ProductionInput) -> AppResult<ProductionView> {
        validate_input(&input)?;

        let mut tx = self.db.begin().await?;

        let product_id = lock_product_by_name(&mut tx, &input.product_name).await?;
        let materials = lock_product_materials(&mut tx, product_id).await?;

        check_consumptions(&input.quantity_of_raw_materials, &materials)?;

        debit_materials(&mut tx, &input.quantity_of_raw_materials, &materials).await?;

        sqlx::query("UPDATE products SET quantity = quantity + $1 WHERE id = $2")
            .bind(input.no_of_units_produced)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let production_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO productions (product_id, no_of_units_produced)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(input.no_of_units_produced)
        .fetch_one(&mut *tx)
        .await?;

        insert_entries(&mut tx, production_id, &input.quantity_of_raw_materials, &materials)
            .await?;

        tx.commit().await?;

        self.get(production_id).await
    }

    /// Edit a production run: revert the old effect, then apply the new one
    ///
    /// Both halves commit together; when the new consumptions cannot be
    /// covered by the reverted balances, nothing changes.
    pub async fn update(&self, id: Uuid, input: ProductionInput) -> AppResult<ProductionView> {
        validate_input(&input)?;

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, (Uuid, Uuid, i32)>(
            "SELECT id, product_id, no_of_units_produced FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production record".to_string()))?;

        let (_, old_product_id, old_units) = existing;

        let product_id = lock_product_by_name(&mut tx, &input.product_name).await?;

        // Revert the old run: credit every consumed material back and take
        // the previously produced units off the old product.
        let old_entries = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT material_id, quantity FROM production_materials WHERE production_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for (material_id, quantity) in &old_entries {
            sqlx::query("UPDATE materials SET stock = stock + $1 WHERE id = $2")
                .bind(quantity)
                .bind(material_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE products SET quantity = quantity - $1 WHERE id = $2")
            .bind(old_units)
            .bind(old_product_id)
            .execute(&mut *tx)
            .await?;

        // Validate the new run against the reverted balances.
        let materials = lock_product_materials(&mut tx, product_id).await?;
        check_consumptions(&input.quantity_of_raw_materials, &materials)?;

        debit_materials(&mut tx, &input.quantity_of_raw_materials, &materials).await?;

        sqlx::query("UPDATE products SET quantity = quantity + $1 WHERE id = $2")
            .bind(input.no_of_units_produced)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE productions
            SET product_id = $1, no_of_units_produced = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(product_id)
        .bind(input.no_of_units_produced)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM production_materials WHERE production_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_entries(&mut tx, id, &input.quantity_of_raw_materials, &materials).await?;

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete a production run, reverting its stock effects
    ///
    /// Materials are credited back; the product's quantity is debited with a
    /// floor of zero. Dangling references are skipped.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, (Uuid, Uuid, i32)>(
            "SELECT id, product_id, no_of_units_produced FROM productions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Production record".to_string()))?;

        let (_, product_id, units) = existing;

        let entries = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT material_id, quantity FROM production_materials WHERE production_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for (material_id, quantity) in &entries {
            sqlx::query("UPDATE materials SET stock = stock + $1 WHERE id = $2")
                .bind(quantity)
                .bind(material_id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE products SET quantity = GREATEST(quantity - $1, 0) WHERE id = $2")
            .bind(units)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM productions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List all production records with names resolved
    pub async fn list(&self) -> AppResult<Vec<ProductionView>> {
        let rows = sqlx::query_as::<_, ProductionRow>(&format!(
            "{} ORDER BY p.created_at DESC",
            PRODUCTION_ROW_QUERY
        ))
        .fetch_all(&self.db)
        .await?;

        self.attach_entries(rows).await
    }

    /// List one page of production records, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<ProductionView>, i64)> {
        let rows = sqlx::query_as::<_, ProductionRow>(&format!(
            "{} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2",
            PRODUCTION_ROW_QUERY
        ))
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM productions")
            .fetch_one(&self.db)
            .await?;

        Ok((self.attach_entries(rows).await?, total))
    }

    /// Get a production record by id with names resolved
    pub async fn get(&self, id: Uuid) -> AppResult<ProductionView> {
        let row = sqlx::query_as::<_, ProductionRow>(&format!(
            "{} WHERE p.id = $1",
            PRODUCTION_ROW_QUERY
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production record".to_string()))?;

        let mut views = self.attach_entries(vec![row]).await?;
        Ok(views.remove(0))
    }

    /// Load consumption entries for the given production records
    async fn attach_entries(&self, rows: Vec<ProductionRow>) -> AppResult<Vec<ProductionView>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let entries = sqlx::query_as::<_, (Uuid, Option<String>, Decimal)>(
            r#"
            SELECT pm.production_id, m.name, pm.quantity
            FROM production_materials pm
            LEFT JOIN materials m ON m.id = pm.material_id
            WHERE pm.production_id = ANY($1)
            ORDER BY pm.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ProductionMaterial>> = HashMap::new();
        for (production_id, raw_material_name, quantity) in entries {
            grouped.entry(production_id).or_default().push(ProductionMaterial {
                raw_material_name,
                quantity,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| ProductionView {
                id: row.id,
                product_name: row.product_name,
                no_of_units_produced: row.no_of_units_produced,
                quantity_of_raw_materials: grouped.remove(&row.id).unwrap_or_default(),
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

/// Reject non-positive unit counts and negative consumptions up front
fn validate_input(input: &ProductionInput) -> AppResult<()> {
    if input.no_of_units_produced < 1 {
        return Err(AppError::Validation(
            "Number of units produced must be at least 1".to_string(),
        ));
    }
    for item in &input.quantity_of_raw_materials {
        if item.quantity < Decimal::ZERO {
            return Err(AppError::Validation(
                "Raw material quantity cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}

/// Lock an available product row by name
async fn lock_product_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> AppResult<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM products WHERE name = $1 AND is_available = TRUE FOR UPDATE",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// Lock the product's raw material rows and read their balances
async fn lock_product_materials(
    tx: &mut Transaction<'_, Postgres>,
    product_id: Uuid,
) -> AppResult<Vec<MaterialStock>> {
    let materials = sqlx::query_as::<_, MaterialStock>(
        r#"
        SELECT m.id, m.name, m.stock
        FROM product_materials pm
        JOIN materials m ON m.id = pm.material_id
        WHERE pm.product_id = $1
        ORDER BY m.name
        FOR UPDATE OF m
        "#,
    )
    .bind(product_id)
    .fetch_all(&mut **tx)
    .await?;

    Ok(materials)
}

/// Reject consumptions naming foreign materials or exceeding balances
fn check_consumptions(
    requested: &[ProductionMaterialInput],
    materials: &[MaterialStock],
) -> AppResult<()> {
    let invalid = invalid_materials(requested, materials);
    if !invalid.is_empty() {
        return Err(AppError::InvalidRawMaterials {
            invalid_materials: invalid,
        });
    }

    let insufficient = insufficient_materials(requested, materials);
    if !insufficient.is_empty() {
        return Err(AppError::InsufficientMaterials {
            insufficient_materials: insufficient,
        });
    }

    Ok(())
}

/// Debit each requested consumption from its material's balance
async fn debit_materials(
    tx: &mut Transaction<'_, Postgres>,
    requested: &[ProductionMaterialInput],
    materials: &[MaterialStock],
) -> AppResult<()> {
    for item in requested {
        let material = materials
            .iter()
            .find(|m| m.name == item.raw_material_name)
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        sqlx::query("UPDATE materials SET stock = stock - $1 WHERE id = $2")
            .bind(item.quantity)
            .bind(material.id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// Store consumption entries with names resolved to material ids
async fn insert_entries(
    tx: &mut Transaction<'_, Postgres>,
    production_id: Uuid,
    requested: &[ProductionMaterialInput],
    materials: &[MaterialStock],
) -> AppResult<()> {
    for item in requested {
        let material = materials
            .iter()
            .find(|m| m.name == item.raw_material_name)
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        sqlx::query(
            "INSERT INTO production_materials (production_id, material_id, quantity) VALUES ($1, $2, $3)",
        )
        .bind(production_id)
        .bind(material.id)
        .bind(item.quantity)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stock(name: &str, stock: &str) -> MaterialStock {
        MaterialStock {
            id: Uuid::new_v4(),
            name: name.to_string(),
            stock: dec(stock),
        }
    }

    fn req(name: &str, quantity: &str) -> ProductionMaterialInput {
        ProductionMaterialInput {
            raw_material_name: name.to_string(),
            quantity: dec(quantity),
        }
    }

    #[test]
    fn test_invalid_materials_flags_unknown_names() {
        let known = vec![stock("pigment", "10"), stock("solvent", "5")];
        let requested = vec![req("pigment", "2"), req("resin", "1")];

        assert_eq!(invalid_materials(&requested, &known), vec!["resin"]);
    }

    #[test]
    fn test_invalid_materials_empty_when_all_known() {
        let known = vec![stock("pigment", "10")];
        let requested = vec![req("pigment", "2")];

        assert!(invalid_materials(&requested, &known).is_empty());
    }

    #[test]
    fn test_insufficient_materials_reports_required_vs_available() {
        let known = vec![stock("pigment", "3"), stock("solvent", "10")];
        let requested = vec![req("pigment", "5"), req("solvent", "4")];

        let insufficient = insufficient_materials(&requested, &known);
        assert_eq!(insufficient.len(), 1);
        assert_eq!(insufficient[0].raw_material_name, "pigment");
        assert_eq!(insufficient[0].required_quantity, dec("5"));
        assert_eq!(insufficient[0].available_stock, dec("3"));
    }

    #[test]
    fn test_insufficient_materials_exact_stock_is_enough() {
        let known = vec![stock("pigment", "5")];
        let requested = vec![req("pigment", "5")];

        assert!(insufficient_materials(&requested, &known).is_empty());
    }
}
