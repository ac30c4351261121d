//! # Report Repository
//!
//! Read-only aggregation over a tenant's orders and products: the sales
//! report and the dashboard.
//!
//! The sales report reads order totals and line items inside one
//! transaction so both come from the same snapshot of the database.

use sqlx::SqlitePool;
use std::collections::HashMap;
use stockbook_core::{
    CostBasis, CostedLine, Dashboard, Money, OrderItem, Product, SalesReport, StockLevel, TenantId,
};
use tracing::debug;

use super::product::ProductRepository;
use super::PRODUCT_COLUMNS;
use crate::error::{DbError, DbResult};

const DASHBOARD_LIST_LIMIT: i64 = 5;

/// Repository for reports of one tenant.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl ReportRepository {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        ReportRepository { pool, tenant_id }
    }

    /// Total sales, cost of goods sold and profit over every order of the
    /// tenant.
    pub async fn sales_report(&self, basis: CostBasis) -> DbResult<SalesReport> {
        debug!(tenant = %self.tenant_id, basis = %basis, "Computing sales report");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let totals: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT o.total_price_cents
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE c.tenant_id = ?1
            "#,
        )
        .bind(self.tenant_id.as_str())
        .fetch_all(&mut *tx)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, oi.sku_snapshot, oi.name_snapshot,
                   oi.quantity, oi.sale_price_cents, oi.unit_cost_cents, oi.created_at
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN customers c ON c.id = o.customer_id
            WHERE c.tenant_id = ?1
            "#,
        )
        .bind(self.tenant_id.as_str())
        .fetch_all(&mut *tx)
        .await?;

        let lines = match basis {
            CostBasis::Snapshot => items.iter().map(CostedLine::snapshot).collect::<Vec<_>>(),
            CostBasis::Live => {
                let products: HashMap<String, Product> = sqlx::query_as::<_, Product>(&format!(
                    "SELECT {} FROM products WHERE tenant_id = ?1",
                    PRODUCT_COLUMNS
                ))
                .bind(self.tenant_id.as_str())
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect();

                items
                    .iter()
                    .map(|item| -> DbResult<CostedLine> {
                        let product = products.get(&item.product_id).ok_or_else(|| {
                            DbError::Internal(format!(
                                "order item {} references missing product {}",
                                item.id, item.product_id
                            ))
                        })?;
                        Ok(CostedLine::live(item.quantity, product)?)
                    })
                    .collect::<DbResult<Vec<_>>>()?
            }
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(SalesReport::compute(
            basis,
            totals.into_iter().map(Money::from_cents),
            lines,
        )?)
    }

    /// Counts, low stock and the short product lists shown on the dashboard.
    pub async fn dashboard(&self, low_stock_threshold: i64) -> DbResult<Dashboard> {
        debug!(tenant = %self.tenant_id, low_stock_threshold, "Building dashboard");

        let tenant = self.tenant_id.as_str();

        let (product_count, supplier_count, customer_count): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products WHERE tenant_id = ?1),
                (SELECT COUNT(*) FROM suppliers WHERE tenant_id = ?1),
                (SELECT COUNT(*) FROM customers WHERE tenant_id = ?1)
            "#,
        )
        .bind(tenant)
        .fetch_one(&self.pool)
        .await?;

        let low_stock_products = self.products().low_stock(low_stock_threshold).await?;

        let top_stocked = sqlx::query_as::<_, StockLevel>(
            r#"
            SELECT id, sku, name, quantity FROM products
            WHERE tenant_id = ?1
            ORDER BY quantity DESC, name
            LIMIT ?2
            "#,
        )
        .bind(tenant)
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        let recent_products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE tenant_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            PRODUCT_COLUMNS
        ))
        .bind(tenant)
        .bind(DASHBOARD_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(Dashboard {
            product_count,
            supplier_count,
            customer_count,
            low_stock_threshold,
            low_stock_count: low_stock_products.len() as i64,
            low_stock_products,
            top_stocked,
            recent_products,
        })
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.tenant_id.clone())
    }
}
