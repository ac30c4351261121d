//! # Product Repository
//!
//! Tenant-scoped product CRUD and stock listings.
//!
//! Stock is never written here except through a full update entered by
//! the tenant. Order-driven decrements go through
//! [`InventoryLedger`](super::ledger::InventoryLedger).
//!
//! ## Supplier Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSERT INTO products (...)                                            │
//! │  SELECT ...                                                            │
//! │  WHERE supplier_id IS NULL                                             │
//! │     OR EXISTS (supplier with that id AND this tenant)                  │
//! │                                                                         │
//! │  0 rows inserted → Supplier not found                                  │
//! │  A product can never point at another tenant's supplier.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use stockbook_core::{Entity, Product, ProductInput, TenantId};
use tracing::{debug, info};

use super::{delete, generate_id, PRODUCT_COLUMNS};
use crate::error::{DbError, DbResult};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl ProductRepository {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        ProductRepository { pool, tenant_id }
    }

    /// All products of the tenant, by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!(tenant = %self.tenant_id, "Listing products");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 ORDER BY name, sku",
            PRODUCT_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products with stock on hand, the only ones offered on the order form.
    pub async fn list_in_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 AND quantity > 0 ORDER BY name, sku",
            PRODUCT_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products with `quantity < threshold`, lowest stock first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        debug!(tenant = %self.tenant_id, threshold, "Listing low stock products");

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 AND quantity < ?2 ORDER BY quantity, name",
            PRODUCT_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products bought from one supplier.
    pub async fn list_by_supplier(&self, supplier_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 AND supplier_id = ?2 ORDER BY name, sku",
            PRODUCT_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product, or `None` if absent or owned by another tenant.
    pub async fn find(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE id = ?1 AND tenant_id = ?2",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product or fails with `NotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(NotFound)` - `supplier_id` is not one of the tenant's suppliers
    /// * `Err(Duplicate)` - SKU already used by this tenant
    pub async fn insert(&self, input: &ProductInput) -> DbResult<Product> {
        let input = input.validated()?;
        debug!(tenant = %self.tenant_id, sku = %input.sku, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            tenant_id: self.tenant_id.as_str().to_string(),
            supplier_id: input.supplier_id.clone(),
            sku: input.sku.clone(),
            name: input.name.clone(),
            quantity: input.quantity,
            wholesale_price_cents: input.wholesale_price_cents,
            import_charge_cents: input.import_charge_cents,
            total_weight_milli: input.total_weight_milli,
            per_weight_cost_cents: input.per_weight_cost_cents,
            domestic_charge_cents: input.domestic_charge_cents,
            created_at: now,
            updated_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, supplier_id, sku, name, quantity,
                wholesale_price_cents, import_charge_cents, total_weight_milli,
                per_weight_cost_cents, domestic_charge_cents, created_at, updated_at
            )
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12
            WHERE ?3 IS NULL
               OR EXISTS (SELECT 1 FROM suppliers WHERE id = ?3 AND tenant_id = ?2)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.supplier_id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.wholesale_price_cents)
        .bind(product.import_charge_cents)
        .bind(product.total_weight_milli)
        .bind(product.per_weight_cost_cents)
        .bind(product.domestic_charge_cents)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("sku", &product.sku))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(
                "Supplier",
                product.supplier_id.as_deref().unwrap_or_default(),
            ));
        }

        info!(tenant = %self.tenant_id, id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    /// Replaces every editable field of a product.
    pub async fn update(&self, id: &str, input: &ProductInput) -> DbResult<Product> {
        let input = input.validated()?;
        debug!(tenant = %self.tenant_id, id = %id, "Updating product");

        let updated = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                supplier_id = ?3,
                sku = ?4,
                name = ?5,
                quantity = ?6,
                wholesale_price_cents = ?7,
                import_charge_cents = ?8,
                total_weight_milli = ?9,
                per_weight_cost_cents = ?10,
                domestic_charge_cents = ?11,
                updated_at = ?12
            WHERE id = ?1 AND tenant_id = ?2
              AND (?3 IS NULL
                   OR EXISTS (SELECT 1 FROM suppliers WHERE id = ?3 AND tenant_id = ?2))
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .bind(&input.supplier_id)
        .bind(&input.sku)
        .bind(&input.name)
        .bind(input.quantity)
        .bind(input.wholesale_price_cents)
        .bind(input.import_charge_cents)
        .bind(input.total_weight_milli)
        .bind(input.per_weight_cost_cents)
        .bind(input.domestic_charge_cents)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("sku", &input.sku))?;

        match updated {
            Some(product) => {
                info!(tenant = %self.tenant_id, id = %id, "Product updated");
                Ok(product)
            }
            None => {
                // Either the product or the supplier is not the tenant's
                self.get(id).await?;
                Err(DbError::not_found(
                    "Supplier",
                    input.supplier_id.as_deref().unwrap_or_default(),
                ))
            }
        }
    }

    /// Deletes a product. Restricted while order items reference it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete::delete_owned(&self.pool, &self.tenant_id, Entity::Product, id).await
    }

    /// Number of products of the tenant.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1")
            .bind(self.tenant_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
