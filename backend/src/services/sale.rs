//! Sales workflow
//!
//! A sale debits the product's quantity when recorded, credits it back when
//! deleted, and adjusts by the unit delta when edited. Each operation locks
//! the product row inside one transaction so concurrent sales cannot
//! oversell the same stock.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::SaleView;
use shared::types::{page_offset, PAGE_SIZE};

/// Service for sales transactions and their stock effects
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input for creating or editing a sale; the product is named
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleInput {
    pub product_name: String,
    pub customer_name: Option<String>,
    pub no_of_units_sold: i32,
}

const SALE_VIEW_QUERY: &str = r#"
SELECT s.id, p.name AS product_name, s.customer_name, s.no_of_units_sold,
       p.price_per_unit,
       CASE WHEN p.price_per_unit IS NULL THEN s.total_sale
            ELSE s.no_of_units_sold * p.price_per_unit
       END AS total_sale,
       s.created_at
FROM sales s
LEFT JOIN products p ON p.id = s.product_id
"#;

/// Total amount of a sale line
pub fn total_sale(units: i32, price_per_unit: Decimal) -> Decimal {
    Decimal::from(units) * price_per_unit
}

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a sale, debiting the product's quantity
    pub async fn create(&self, input: SaleInput) -> AppResult<SaleView> {
        if input.no_of_units_sold < 0 {
            return Err(AppError::Validation(
                "Number of units sold cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let (product_id, quantity, price_per_unit) = sqlx::query_as::<_, (Uuid, i32, Decimal)>(
            r#"
            SELECT id, quantity, price_per_unit FROM products
            WHERE name = $1 AND is_available = TRUE
            FOR UPDATE
            "#,
        )
        .bind(&input.product_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if quantity < input.no_of_units_sold {
            return Err(AppError::Validation(
                "Insufficient product stock for the sale".to_string(),
            ));
        }

        sqlx::query("UPDATE products SET quantity = quantity - $1 WHERE id = $2")
            .bind(input.no_of_units_sold)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let customer_name = input.customer_name.unwrap_or_else(|| "None".to_string());
        let total = total_sale(input.no_of_units_sold, price_per_unit);

        let sale_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales (product_id, customer_name, no_of_units_sold, total_sale)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(&customer_name)
        .bind(input.no_of_units_sold)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(sale_id).await
    }

    /// Edit a sale, adjusting the product's quantity by the unit delta
    ///
    /// The stock adjustment hits the product resolved by name; the sale's
    /// stored product reference is left as recorded.
    pub async fn update(&self, id: Uuid, input: SaleInput) -> AppResult<SaleView> {
        if input.no_of_units_sold < 0 {
            return Err(AppError::Validation(
                "Number of units sold cannot be negative".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        let (sale_id, old_units) = sqlx::query_as::<_, (Uuid, i32)>(
            "SELECT id, no_of_units_sold FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale record".to_string()))?;

        let (product_id, quantity, price_per_unit) = sqlx::query_as::<_, (Uuid, i32, Decimal)>(
            r#"
            SELECT id, quantity, price_per_unit FROM products
            WHERE name = $1 AND is_available = TRUE
            FOR UPDATE
            "#,
        )
        .bind(&input.product_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let delta = input.no_of_units_sold - old_units;

        if quantity < delta {
            return Err(AppError::Validation(
                "Insufficient product stock for the update".to_string(),
            ));
        }

        sqlx::query("UPDATE products SET quantity = quantity - $1 WHERE id = $2")
            .bind(delta)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let customer_name = input.customer_name.unwrap_or_else(|| "None".to_string());
        let total = total_sale(input.no_of_units_sold, price_per_unit);

        sqlx::query(
            r#"
            UPDATE sales
            SET customer_name = $1, no_of_units_sold = $2, total_sale = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(&customer_name)
        .bind(input.no_of_units_sold)
        .bind(total)
        .bind(sale_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(sale_id).await
    }

    /// Delete a sale, crediting its units back to the product
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let (sale_id, product_id, units) = sqlx::query_as::<_, (Uuid, Uuid, i32)>(
            "SELECT id, product_id, no_of_units_sold FROM sales WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale record".to_string()))?;

        let product_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Associated product".to_string()))?;

        sqlx::query("UPDATE products SET quantity = quantity + $1 WHERE id = $2")
            .bind(units)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List all sales with the running total amount
    pub async fn list(&self) -> AppResult<(Vec<SaleView>, Decimal)> {
        let sales = sqlx::query_as::<_, SaleView>(&format!(
            "{} ORDER BY s.created_at DESC",
            SALE_VIEW_QUERY
        ))
        .fetch_all(&self.db)
        .await?;

        let total_amount: Decimal = sales.iter().map(|s| s.total_sale).sum();

        Ok((sales, total_amount))
    }

    /// List one page of sales, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<SaleView>, i64)> {
        let sales = sqlx::query_as::<_, SaleView>(&format!(
            "{} ORDER BY s.created_at DESC LIMIT $1 OFFSET $2",
            SALE_VIEW_QUERY
        ))
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.db)
            .await?;

        Ok((sales, total))
    }

    /// Get a sale by id with its product resolved
    pub async fn get(&self, id: Uuid) -> AppResult<SaleView> {
        sqlx::query_as::<_, SaleView>(&format!("{} WHERE s.id = $1", SALE_VIEW_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_total_sale() {
        let price = Decimal::from_str("2").unwrap();
        assert_eq!(total_sale(5, price), Decimal::from(10));
    }

    #[test]
    fn test_total_sale_zero_units() {
        let price = Decimal::from_str("9.99").unwrap();
        assert_eq!(total_sale(0, price), Decimal::ZERO);
    }
}
