//! Vendor catalog service
//!
//! Vendors map materials to vendor-specific prices; the order workflow reads
//! these entries to price purchase orders.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Vendor, VendorMaterialEntry, VendorView};
use shared::types::{page_offset, PAGE_SIZE};
use shared::validation::validate_email;

/// Service for managing vendors and their priced material entries
#[derive(Clone)]
pub struct VendorService {
    db: PgPool,
}

/// One priced material entry in a vendor request, keyed by material name
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMaterialInput {
    pub material_name: String,
    pub cost_per_unit: Decimal,
}

/// Input for adding a vendor
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorInput {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub address: String,
    pub materials: Vec<VendorMaterialInput>,
}

/// Input for editing a vendor; a provided materials list replaces the catalog
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub materials: Option<Vec<VendorMaterialInput>>,
}

impl VendorService {
    /// Create a new VendorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Add a new vendor with its priced material entries
    pub async fn create(&self, input: CreateVendorInput) -> AppResult<VendorView> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation("Vendor name is required".to_string()));
        }
        validate_email(&input.email).map_err(|e| AppError::Validation(e.to_string()))?;

        for entry in &input.materials {
            if entry.cost_per_unit <= Decimal::ZERO {
                return Err(AppError::Validation(
                    "Cost per unit must be a positive value".to_string(),
                ));
            }
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM vendors WHERE name = $1 OR email = $2)",
        )
        .bind(&input.name)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if exists {
            return Err(AppError::conflict("vendor", "Vendor already exists"));
        }

        let resolved = self.resolve_materials(&input.materials).await?;

        let mut tx = self.db.begin().await?;

        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (name, contact, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, contact, email, address
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&mut *tx)
        .await?;

        for (material_id, entry) in resolved.iter().zip(input.materials.iter()) {
            sqlx::query(
                "INSERT INTO vendor_materials (vendor_id, material_id, cost_per_unit) VALUES ($1, $2, $3)",
            )
            .bind(vendor.id)
            .bind(material_id)
            .bind(entry.cost_per_unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get(vendor.id).await
    }

    /// Edit a vendor; absent fields keep their current values
    pub async fn update(&self, id: Uuid, input: UpdateVendorInput) -> AppResult<VendorView> {
        let existing = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, contact, email, address FROM vendors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        let name = input.name.unwrap_or(existing.name);
        let contact = input.contact.unwrap_or(existing.contact);
        let email = input.email.unwrap_or(existing.email);
        let address = input.address.unwrap_or(existing.address);

        validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM vendors WHERE (name = $1 OR email = $2) AND id <> $3)",
        )
        .bind(&name)
        .bind(&email)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::conflict("vendor", "Vendor already exists"));
        }

        let resolved = match &input.materials {
            Some(entries) => {
                for entry in entries {
                    if entry.cost_per_unit <= Decimal::ZERO {
                        return Err(AppError::Validation(
                            "Cost per unit must be a positive value".to_string(),
                        ));
                    }
                }
                Some(self.resolve_materials(entries).await?)
            }
            None => None,
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            "UPDATE vendors SET name = $1, contact = $2, email = $3, address = $4 WHERE id = $5",
        )
        .bind(&name)
        .bind(&contact)
        .bind(&email)
        .bind(&address)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let (Some(material_ids), Some(entries)) = (resolved, input.materials.as_ref()) {
            sqlx::query("DELETE FROM vendor_materials WHERE vendor_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            for (material_id, entry) in material_ids.iter().zip(entries.iter()) {
                sqlx::query(
                    "INSERT INTO vendor_materials (vendor_id, material_id, cost_per_unit) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(material_id)
                .bind(entry.cost_per_unit)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.get(id).await
    }

    /// Delete a vendor and its catalog entries
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vendor".to_string()));
        }

        Ok(())
    }

    /// Get a vendor with its catalog entries
    pub async fn get(&self, id: Uuid) -> AppResult<VendorView> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, contact, email, address FROM vendors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        let mut views = self.attach_entries(vec![vendor]).await?;
        Ok(views.remove(0))
    }

    /// List all vendors with their catalog entries
    pub async fn list(&self) -> AppResult<Vec<VendorView>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, contact, email, address FROM vendors ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        self.attach_entries(vendors).await
    }

    /// List one page of vendors with their catalog entries, with total count
    pub async fn list_page(&self, page: i64) -> AppResult<(Vec<VendorView>, i64)> {
        let vendors = sqlx::query_as::<_, Vendor>(
            "SELECT id, name, contact, email, address FROM vendors ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vendors")
            .fetch_one(&self.db)
            .await?;

        Ok((self.attach_entries(vendors).await?, total))
    }

    /// Resolve material names to ids, preserving input order
    async fn resolve_materials(&self, entries: &[VendorMaterialInput]) -> AppResult<Vec<Uuid>> {
        let names: Vec<String> = entries.iter().map(|e| e.material_name.clone()).collect();

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, name FROM materials WHERE name = ANY($1)",
        )
        .bind(&names)
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

        Ok(entries
            .iter()
            .map(|e| by_name[e.material_name.as_str()])
            .collect())
    }

    /// Load catalog entries for the given vendors, in insertion order
    async fn attach_entries(&self, vendors: Vec<Vendor>) -> AppResult<Vec<VendorView>> {
        let ids: Vec<Uuid> = vendors.iter().map(|v| v.id).collect();

        let rows = sqlx::query_as::<_, (Uuid, Option<String>, Decimal)>(
            r#"
            SELECT vm.vendor_id, m.name, vm.cost_per_unit
            FROM vendor_materials vm
            LEFT JOIN materials m ON m.id = vm.material_id
            WHERE vm.vendor_id = ANY($1)
            ORDER BY vm.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.db)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<VendorMaterialEntry>> = HashMap::new();
        for (vendor_id, material_name, cost_per_unit) in rows {
            grouped.entry(vendor_id).or_default().push(VendorMaterialEntry {
                material_name,
                cost_per_unit,
            });
        }

        Ok(vendors
            .into_iter()
            .map(|vendor| {
                let materials = grouped.remove(&vendor.id).unwrap_or_default();
                VendorView { vendor, materials }
            })
            .collect())
    }
}
