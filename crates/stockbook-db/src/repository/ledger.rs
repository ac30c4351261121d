//! # Inventory Ledger
//!
//! Owns product stock. The only code path that decrements `quantity` for
//! an order.
//!
//! ## Atomic Reservation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ❌ Read-then-write (oversells under concurrency)                       │
//! │     SELECT quantity …          -- both requests read 5                 │
//! │     UPDATE … SET quantity = 2  -- both write, 6 units sold from 5      │
//! │                                                                         │
//! │  ✅ One conditional statement                                           │
//! │     UPDATE products                                                    │
//! │        SET quantity = quantity - N                                     │
//! │      WHERE id = ? AND tenant_id = ? AND quantity >= N                  │
//! │     RETURNING …                                                        │
//! │                                                                         │
//! │     row returned → reserved, stock after decrement                     │
//! │     no row       → look again: missing/foreign → NotFound              │
//! │                                 present       → InsufficientStock      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`reserve_stock`] runs on the caller's connection so the order engine
//! can include every reservation in its own transaction; a failed order
//! rolls all of them back.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use stockbook_core::validation::validate_line_quantity;
use stockbook_core::{CoreError, Product, TenantId};
use tracing::{debug, info};

use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};

/// A successful reservation.
#[derive(Debug, Clone)]
pub struct Reservation {
    /// The product after the decrement.
    pub product: Product,
    /// Units taken.
    pub quantity: i64,
}

impl Reservation {
    /// Stock left after the reservation.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.product.quantity
    }

    /// The product as it was just before the reservation.
    pub fn product_before(&self) -> Product {
        Product {
            quantity: self.product.quantity + self.quantity,
            ..self.product.clone()
        }
    }
}

/// Reserves `quantity` units of a tenant's product on `conn`.
///
/// ## Errors
/// - `Validation` - quantity not positive
/// - `NotFound` - product absent or owned by another tenant
/// - `InsufficientStock` - fewer than `quantity` units on hand
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    tenant_id: &TenantId,
    product_id: &str,
    quantity: i64,
) -> DbResult<Reservation> {
    validate_line_quantity(quantity)?;

    debug!(tenant = %tenant_id, product_id = %product_id, quantity, "Reserving stock");

    let reserved = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET quantity = quantity - ?1, updated_at = ?2
        WHERE id = ?3 AND tenant_id = ?4 AND quantity >= ?1
        RETURNING {}
        "#,
        PRODUCT_COLUMNS
    ))
    .bind(quantity)
    .bind(Utc::now())
    .bind(product_id)
    .bind(tenant_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(product) = reserved {
        return Ok(Reservation { product, quantity });
    }

    let current: Option<(String, i64)> =
        sqlx::query_as("SELECT sku, quantity FROM products WHERE id = ?1 AND tenant_id = ?2")
            .bind(product_id)
            .bind(tenant_id.as_str())
            .fetch_optional(&mut *conn)
            .await?;

    match current {
        None => Err(DbError::not_found("Product", product_id)),
        Some((sku, available)) => Err(CoreError::InsufficientStock {
            sku,
            available,
            requested: quantity,
        }
        .into()),
    }
}

/// Stand-alone access to the ledger for one tenant.
#[derive(Debug, Clone)]
pub struct InventoryLedger {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl InventoryLedger {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        InventoryLedger { pool, tenant_id }
    }

    /// Reserves stock in its own transaction and returns the remaining quantity.
    pub async fn reserve(&self, product_id: &str, quantity: i64) -> DbResult<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let reservation = reserve_stock(&mut *tx, &self.tenant_id, product_id, quantity).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            tenant = %self.tenant_id,
            product_id = %product_id,
            quantity,
            remaining = reservation.remaining(),
            "Stock reserved"
        );
        Ok(reservation.remaining())
    }

    /// Current on-hand quantity.
    pub async fn stock_level(&self, product_id: &str) -> DbResult<i64> {
        let quantity: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1 AND tenant_id = ?2")
                .bind(product_id)
                .bind(self.tenant_id.as_str())
                .fetch_optional(&self.pool)
                .await?;

        quantity.ok_or_else(|| DbError::not_found("Product", product_id))
    }
}
