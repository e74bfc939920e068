//! Product ledger service
//!
//! `quantity` mutations happen only through the production and sales
//! workflows; this service covers CRUD and the soft-delete flag.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductView, RawMaterialRef};
use shared::types::{page_offset, PAGE_SIZE};

/// Service for managing manufactured products
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for adding a product; raw materials are given by name
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub name: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub raw_materials: Vec<String>,
}

/// Input for editing a product; a provided raw material list replaces it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub quantity: Option<i32>,
    pub price_per_unit: Option<Decimal>,
    pub raw_materials: Option<Vec<String>>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a new product built from the named raw materials
    pub async fn create(&self, input: CreateProductInput) -> AppResult<ProductView> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Product name is required".to_string()));
        }
        if input.quantity < 0 {
            return Err(AppError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }
        if input.price_per_unit <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price per unit must be a positive value".to_string(),
            ));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1)",
        )
        .bind(&input.name)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict("product", "Product already exists"));
        }

        let material_ids = self.resolve_material_names(&input.raw_materials).await?;

        let mut tx = self.db.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, quantity, price_per_unit)
            VALUES ($1, $2, $3)
            RETURNING id, name, quantity, price_per_unit, is_available
            "#,
        )
        .bind(&input.name)
        .bind(input.quantity)
        .bind(input.price_per_unit)
        .fetch_one(&mut *tx)
        .await?;

        for material_id in &material_ids {
            sqlx::query(
                "INSERT INTO product_materials (product_id, material_id) VALUES ($1, $2)",
            )
            .bind(product.id)
            .bind(material_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(product.id).await
    }

    /// Get a product by id, regardless of availability
    pub async fn get(&self, id: Uuid) -> AppResult<ProductView> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, quantity, price_per_unit, is_available FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let mut views = self.attach_materials(vec![product]).await?;
        Ok(views.remove(0))
    }

    /// List all available products
    pub async fn list(&self) -> AppResult<Vec<ProductView>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, quantity, price_per_unit, is_available FROM products \
             WHERE is_available = TRUE ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        self.attach_materials(products).await
    }

    /// List one page of available products, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<ProductView>, i64)> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, quantity, price_per_unit, is_available FROM products \
             WHERE is_available = TRUE ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE is_available = TRUE",
        )
        .fetch_one(&self.db)
        .await?;

        Ok((self.attach_materials(products).await?, total))
    }

    /// Edit a product; absent fields keep their current values
    pub async fn update(&self, id: Uuid, input: UpdateProductInput) -> AppResult<ProductView> {
        let existing = sqlx::query_as::<_, Product>(
            "SELECT id, name, quantity, price_per_unit, is_available FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let quantity = input.quantity.unwrap_or(existing.quantity);
        let price_per_unit = input.price_per_unit.unwrap_or(existing.price_per_unit);

        if quantity < 0 {
            return Err(AppError::Validation(
                "Quantity cannot be negative".to_string(),
            ));
        }
        if price_per_unit <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Price per unit must be a positive value".to_string(),
            ));
        }

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE name = $1 AND id <> $2)",
        )
        .bind(&name)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::conflict("product", "Product already exists"));
        }

        let material_ids = match &input.raw_materials {
            Some(names) => Some(self.resolve_material_names(names).await?),
            None => None,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE products SET name = $1, quantity = $2, price_per_unit = $3 WHERE id = $4",
        )
        .bind(&name)
        .bind(quantity)
        .bind(price_per_unit)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(material_ids) = material_ids {
            sqlx::query("DELETE FROM product_materials WHERE product_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for material_id in &material_ids {
                sqlx::query(
                    "INSERT INTO product_materials (product_id, material_id) VALUES ($1, $2)",
                )
                .bind(id)
                .bind(material_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Soft-delete a product, hiding it from listings and name resolution
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE products SET is_available = FALSE WHERE id = $1 AND is_available = TRUE",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    /// Resolve raw material names to ids, rejecting unknown names
    async fn resolve_material_names(&self, names: &[String]) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM materials WHERE name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&self.db)
        .await?;

        let by_name: HashMap<&str, Uuid> =
            rows.iter().map(|(id, name)| (name.as_str(), *id)).collect();

        let missing: Vec<String> = names
            .iter()
            .filter(|name| !by_name.contains_key(name.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            return Err(AppError::MissingMaterials {
                missing_materials: missing,
            });
        }

        Ok(names.iter().map(|name| by_name[name.as_str()]).collect())
    }

    /// Load raw material names for the given products
    async fn attach_materials(&self, products: Vec<Product>) -> AppResult<Vec<ProductView>> {
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT pm.product_id, m.name
            FROM product_materials pm
            JOIN materials m ON m.id = pm.material_id
            WHERE pm.product_id = ANY($1)
            ORDER BY m.name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<RawMaterialRef>> = HashMap::new();
        for (product_id, name) in rows {
            grouped
                .entry(product_id)
                .or_default()
                .push(RawMaterialRef { name });
        }

        Ok(products
            .into_iter()
            .map(|product| {
                let raw_materials = grouped.remove(&product.id).unwrap_or_default();
                ProductView {
                    product,
                    raw_materials,
                }
            })
            .collect())
    }
}
