//! Raw material ledger service
//!
//! Pure data access: existence-checked CRUD keyed by unique name or id.
//! Stock mutations happen only through the order and production workflows.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::Material;
use shared::types::{page_offset, PAGE_SIZE};

/// Service for managing raw materials
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

/// Input for adding a material
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterialInput {
    pub name: String,
    pub stock: Option<Decimal>,
    pub unit: String,
    pub threshold: Decimal,
    pub description: Option<String>,
}

/// Input for editing a material; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterialInput {
    pub name: Option<String>,
    pub stock: Option<Decimal>,
    pub unit: Option<String>,
    pub threshold: Option<Decimal>,
    pub description: Option<String>,
}

// Low-stock ranking: materials below their reorder threshold first, then
// tighter thresholds, then lower balances.
const LOW_STOCK_ORDER: &str = "(stock < threshold) DESC, threshold ASC, stock ASC";

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a new material
    pub async fn create(&self, input: CreateMaterialInput) -> AppResult<Material> {
        if input.name.trim().is_empty() || input.unit.trim().is_empty() {
            return Err(AppError::Validation(
                "Material name and unit are required".to_string(),
            ));
        }

        let stock = input.stock.unwrap_or(Decimal::ZERO);
        if stock < Decimal::ZERO {
            return Err(AppError::Validation(
                "Stock cannot be negative".to_string(),
            ));
        }
        if input.threshold < Decimal::ZERO {
            return Err(AppError::Validation(
                "Threshold cannot be negative".to_string(),
            ));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict("material", "Material already exists"));
        }

        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (name, stock, unit, threshold, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, stock, unit, threshold, description
            "#,
        )
        .bind(&input.name)
        .bind(stock)
        .bind(&input.unit)
        .bind(input.threshold)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    /// List all materials in low-stock-first order
    pub async fn list(&self) -> AppResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>(&format!(
            "SELECT id, name, stock, unit, threshold, description FROM materials ORDER BY {}",
            LOW_STOCK_ORDER
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    /// List one page of materials in low-stock-first order, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<Material>, i64)> {
        let materials = sqlx::query_as::<_, Material>(&format!(
            "SELECT id, name, stock, unit, threshold, description FROM materials \
             ORDER BY {} LIMIT $1 OFFSET $2",
            LOW_STOCK_ORDER
        ))
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM materials")
            .fetch_one(&self.db)
            .await?;

        Ok((materials, total))
    }

    /// Get a material by id
    pub async fn get(&self, id: uuid::Uuid) -> AppResult<Material> {
        sqlx::query_as::<_, Material>(
            "SELECT id, name, stock, unit, threshold, description FROM materials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    /// Edit a material; absent fields keep their current values
    pub async fn update(&self, id: uuid::Uuid, input: UpdateMaterialInput) -> AppResult<Material> {
        let existing = self.get(id).await?;

        let name = input.name.unwrap_or(existing.name);
        let stock = input.stock.unwrap_or(existing.stock);
        let unit = input.unit.unwrap_or(existing.unit);
        let threshold = input.threshold.unwrap_or(existing.threshold);
        let description = input.description.or(existing.description);

        if stock < Decimal::ZERO {
            return Err(AppError::Validation(
                "Stock cannot be negative".to_string(),
            ));
        }
        if threshold < Decimal::ZERO {
            return Err(AppError::Validation(
                "Threshold cannot be negative".to_string(),
            ));
        }

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE name = $1 AND id <> $2)",
        )
        .bind(&name)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::conflict("material", "Material already exists"));
        }

        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materials
            SET name = $1, stock = $2, unit = $3, threshold = $4, description = $5
            WHERE id = $6
            RETURNING id, name, stock, unit, threshold, description
            "#,
        )
        .bind(&name)
        .bind(stock)
        .bind(&unit)
        .bind(threshold)
        .bind(&description)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    /// Delete a material
    pub async fn delete(&self, id: uuid::Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Material".to_string()));
        }

        Ok(())
    }
}
