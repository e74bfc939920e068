//! Purchase order workflow
//!
//! Orders are priced from the vendor's catalog at creation and stay
//! `Pending` until received. Receiving credits the material's stock and the
//! status flips to `Received`, both inside one transaction; receiving twice
//! is a conflict. Editing and deleting never touch stock, even for orders
//! that were already received.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{OrderStatus, OrderView};
use shared::types::{page_offset, PAGE_SIZE};

/// Service for the purchase order lifecycle
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Input for creating or editing an order; vendor and material are named
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub vendor_name: String,
    pub material_name: String,
    pub quantity: i32,
}

/// Order row as stored, before name resolution
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    material_id: Uuid,
    quantity: i32,
    status: OrderStatus,
}

const ORDER_VIEW_QUERY: &str = r#"
SELECT o.id, v.name AS vendor, m.name AS material,
       o.quantity, o.cost_per_unit, o.total_cost, o.status
FROM orders o
LEFT JOIN vendors v ON v.id = o.vendor_id
LEFT JOIN materials m ON m.id = o.material_id
"#;

/// Total cost of an order line
pub fn total_cost(quantity: i32, cost_per_unit: Decimal) -> Decimal {
    Decimal::from(quantity) * cost_per_unit
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a pending order priced from the vendor's catalog
    ///
    /// Stock is untouched here; only receiving credits the material.
    pub async fn create(&self, input: OrderInput) -> AppResult<OrderView> {
        let (vendor_id, material_id, cost_per_unit) = self.resolve_pricing(&input).await?;

        let total = total_cost(input.quantity, cost_per_unit);

        let (id, status) = sqlx::query_as::<_, (Uuid, OrderStatus)>(
            r#"
            INSERT INTO orders (vendor_id, material_id, quantity, cost_per_unit, total_cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, status
            "#,
        )
        .bind(vendor_id)
        .bind(material_id)
        .bind(input.quantity)
        .bind(cost_per_unit)
        .bind(total)
        .fetch_one(&self.db)
        .await?;

        Ok(OrderView {
            id,
            vendor: Some(input.vendor_name),
            material: Some(input.material_name),
            quantity: input.quantity,
            cost_per_unit,
            total_cost: total,
            status,
        })
    }

    /// List all orders, pending before received
    pub async fn list(&self) -> AppResult<Vec<OrderView>> {
        let orders =
            sqlx::query_as::<_, OrderView>(&format!("{} ORDER BY o.status", ORDER_VIEW_QUERY))
                .fetch_all(&self.db)
                .await?;

        Ok(orders)
    }

    /// List one page of orders, pending before received, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<OrderView>, i64)> {
        let orders = sqlx::query_as::<_, OrderView>(&format!(
            "{} ORDER BY o.status LIMIT $1 OFFSET $2",
            ORDER_VIEW_QUERY
        ))
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.db)
            .await?;

        Ok((orders, total))
    }

    /// Get an order by id with names resolved
    pub async fn get(&self, id: Uuid) -> AppResult<OrderView> {
        sqlx::query_as::<_, OrderView>(&format!("{} WHERE o.id = $1", ORDER_VIEW_QUERY))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Mark an order received, crediting its material's stock
    ///
    /// The stock credit and status flip commit together; a received order
    /// cannot be received again.
    pub async fn receive(&self, id: Uuid) -> AppResult<OrderView> {
        let mut tx = self.db.begin().await?;

        let order = sqlx::query_as::<_, OrderRow>(
            "SELECT id, material_id, quantity, status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        if order.status == OrderStatus::Received {
            return Err(AppError::conflict(
                "order",
                "Order has already been received",
            ));
        }

        let material_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM materials WHERE id = $1 FOR UPDATE",
        )
        .bind(order.material_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        sqlx::query("UPDATE materials SET stock = stock + $1 WHERE id = $2")
            .bind(Decimal::from(order.quantity))
            .bind(material_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(OrderStatus::Received)
            .bind(order.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get(id).await
    }

    /// Edit an order, re-resolving the vendor price and recomputing the total
    ///
    /// Stock is never adjusted here, even when the order was already
    /// received; the original receipt's credit stands as booked.
    pub async fn update(&self, id: Uuid, input: OrderInput) -> AppResult<OrderView> {
        let (vendor_id, material_id, cost_per_unit) = self.resolve_pricing(&input).await?;

        let total = total_cost(input.quantity, cost_per_unit);

        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE orders
            SET vendor_id = $1, material_id = $2, quantity = $3,
                cost_per_unit = $4, total_cost = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id
            "#,
        )
        .bind(vendor_id)
        .bind(material_id)
        .bind(input.quantity)
        .bind(cost_per_unit)
        .bind(total)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        if updated.is_none() {
            return Err(AppError::NotFound("Order".to_string()));
        }

        self.get(id).await
    }

    /// Delete an order unconditionally
    ///
    /// A prior receipt's stock credit is not reversed.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }

        Ok(())
    }

    /// Resolve vendor, material and the vendor's price for the material
    ///
    /// When the vendor lists the material more than once, the first entry in
    /// insertion order wins.
    async fn resolve_pricing(&self, input: &OrderInput) -> AppResult<(Uuid, Uuid, Decimal)> {
        if input.quantity < 1 {
            return Err(AppError::Validation(
                "Quantity must be a positive value".to_string(),
            ));
        }

        let vendor_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM vendors WHERE name = $1")
            .bind(&input.vendor_name)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        let material_id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM materials WHERE name = $1")
            .bind(&input.material_name)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        let cost_per_unit = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT cost_per_unit FROM vendor_materials
            WHERE vendor_id = $1 AND material_id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(vendor_id)
        .bind(material_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Material \"{}\" in vendor's material list",
                input.material_name
            ))
        })?;

        Ok((vendor_id, material_id, cost_per_unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_total_cost() {
        let cost = Decimal::from_str("3").unwrap();
        assert_eq!(total_cost(4, cost), Decimal::from(12));
    }

    #[test]
    fn test_total_cost_fractional_unit_price() {
        let cost = Decimal::from_str("2.50").unwrap();
        assert_eq!(total_cost(3, cost), Decimal::from_str("7.50").unwrap());
    }
}
