//! # Order Repository (Order Engine)
//!
//! Creates orders as one atomic unit and serves order listings.
//!
//! ## Creation Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │   1. INSERT order row SELECTed from the tenant's customer              │
//! │        0 rows → NotFound(Customer)                 ──► ROLLBACK        │
//! │   2. No lines → EmptyOrder                         ──► ROLLBACK        │
//! │   3. For each line, in submitted order:                                │
//! │        reserve_stock (conditional UPDATE)                              │
//! │          NotFound / InsufficientStock              ──► ROLLBACK        │
//! │        draft.add_line (sale price + unit cost snapshots)               │
//! │        INSERT order_item                                               │
//! │   4. UPDATE order total = Σ(qty × sale price) + delivery charge        │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement is a write, starting with the first, so the transaction
//! holds SQLite's write lock from its first step and never upgrades a read
//! snapshot. Dropping the transaction on any `?` rolls back every
//! reservation made so far.

use chrono::Utc;
use sqlx::SqlitePool;
use stockbook_core::validation::validate_status;
use stockbook_core::{
    Customer, Order, OrderDetail, OrderDraft, OrderFormData, OrderItem, OrderRequest,
    OrderSummary, TenantId, DEFAULT_ORDER_STATUS, SUGGESTED_ORDER_STATUSES,
};
use tracing::{debug, info, warn};

use super::customer::CustomerRepository;
use super::ledger::reserve_stock;
use super::product::ProductRepository;
use super::{generate_id, ORDER_COLUMNS};
use crate::error::{DbError, DbResult};

/// Repository for orders of one tenant.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl OrderRepository {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        OrderRepository { pool, tenant_id }
    }

    /// Creates an order: Draft → Committed, or Draft → Aborted with nothing
    /// persisted.
    ///
    /// ## Errors
    /// - `NotFound` - customer or a product is absent or another tenant's
    /// - `EmptyOrder` - no lines
    /// - `InsufficientStock` - a line asks for more than is on hand
    /// - `Validation` - bad quantity or negative price
    pub async fn create(&self, request: &OrderRequest) -> DbResult<Order> {
        debug!(
            tenant = %self.tenant_id,
            customer_id = %request.customer_id,
            lines = request.lines.len(),
            "Creating order"
        );

        match self.create_in_transaction(request).await {
            Ok(order) => {
                info!(
                    tenant = %self.tenant_id,
                    order_id = %order.id,
                    customer_id = %order.customer_id,
                    total_price_cents = order.total_price_cents,
                    "Order committed"
                );
                Ok(order)
            }
            Err(err) => {
                if err.is_infrastructure() {
                    tracing::error!(tenant = %self.tenant_id, error = %err, "Order creation failed");
                } else {
                    warn!(tenant = %self.tenant_id, error = %err, "Order rejected");
                }
                Err(err)
            }
        }
    }

    async fn create_in_transaction(&self, request: &OrderRequest) -> DbResult<Order> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let order_id = generate_id();
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_id, status, delivery_charge_cents, total_price_cents,
                created_at, updated_at
            )
            SELECT ?1, c.id, ?2, ?3, 0, ?4, ?4
            FROM customers c
            WHERE c.id = ?5 AND c.tenant_id = ?6
            "#,
        )
        .bind(&order_id)
        .bind(DEFAULT_ORDER_STATUS)
        .bind(request.delivery_charge_cents)
        .bind(now)
        .bind(&request.customer_id)
        .bind(self.tenant_id.as_str())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &request.customer_id));
        }

        request.validate()?;

        let mut draft = OrderDraft::new(request.delivery_charge());

        for line in &request.lines {
            let reservation =
                reserve_stock(&mut *tx, &self.tenant_id, &line.product_id, line.quantity).await?;
            let drafted = draft.add_line(&reservation.product_before(), line)?;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id, sku_snapshot, name_snapshot, quantity,
                    sale_price_cents, unit_cost_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(generate_id())
            .bind(&order_id)
            .bind(&drafted.product_id)
            .bind(&drafted.sku)
            .bind(&drafted.name)
            .bind(drafted.quantity)
            .bind(drafted.sale_price.cents())
            .bind(drafted.unit_cost.cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET total_price_cents = ?1 WHERE id = ?2 RETURNING {}",
            ORDER_COLUMNS
        ))
        .bind(draft.total_price()?.cents())
        .bind(&order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(order)
    }

    /// All orders of the tenant, newest first.
    pub async fn list(&self) -> DbResult<Vec<OrderSummary>> {
        debug!(tenant = %self.tenant_id, "Listing orders");

        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT
                o.id, o.customer_id, c.name AS customer_name, o.status,
                o.delivery_charge_cents, o.total_price_cents,
                (SELECT COUNT(*) FROM order_items oi WHERE oi.order_id = o.id) AS item_count,
                o.created_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE c.tenant_id = ?1
            ORDER BY o.created_at DESC, o.rowid DESC
            "#,
        )
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.id, o.customer_id, o.status, o.delivery_charge_cents,
                   o.total_price_cents, o.created_at, o.updated_at
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = ?1 AND c.tenant_id = ?2
            "#,
        )
        .bind(id)
        .bind(self.tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    pub async fn get(&self, id: &str) -> DbResult<Order> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Line items of one of the tenant's orders.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, oi.sku_snapshot, oi.name_snapshot,
                   oi.quantity, oi.sale_price_cents, oi.unit_cost_cents, oi.created_at
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN customers c ON c.id = o.customer_id
            WHERE oi.order_id = ?1 AND c.tenant_id = ?2
            ORDER BY oi.rowid
            "#,
        )
        .bind(order_id)
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Order with its customer and line items.
    pub async fn detail(&self, id: &str) -> DbResult<OrderDetail> {
        let order = self.get(id).await?;
        let customer: Customer = self.customers().get(&order.customer_id).await?;
        let items = self.items(id).await?;

        Ok(OrderDetail {
            order,
            customer,
            items,
        })
    }

    /// Sets the status to any trimmed, non-empty string of at most 50
    /// characters. Stock is not touched.
    pub async fn update_status(&self, id: &str, status: &str) -> DbResult<Order> {
        let status = validate_status(status)?;

        let updated = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET status = ?1, updated_at = ?2
            WHERE id = ?3
              AND customer_id IN (SELECT id FROM customers WHERE tenant_id = ?4)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&status)
        .bind(Utc::now())
        .bind(id)
        .bind(self.tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let order = updated.ok_or_else(|| DbError::not_found("Order", id))?;
        info!(tenant = %self.tenant_id, order_id = %id, status = %status, "Order status updated");
        Ok(order)
    }

    /// Customers and in-stock products for the order form.
    pub async fn form_data(&self) -> DbResult<OrderFormData> {
        Ok(OrderFormData {
            customers: self.customers().list().await?,
            products: self.products().list_in_stock().await?,
            suggested_statuses: SUGGESTED_ORDER_STATUSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE c.tenant_id = ?1
            "#,
        )
        .bind(self.tenant_id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.tenant_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use std::sync::Arc;
    use stockbook_core::validation::MAX_MONEY_CENTS;
    use stockbook_core::{
        CoreError, CostBasis, OrderLineRequest, OrderRequest, Product, ValidationError,
        MAX_LINE_QUANTITY,
    };

    use crate::{Database, DbConfig, DbError};

    fn line(product: &Product, quantity: i64, sale_price_cents: i64) -> OrderLineRequest {
        OrderLineRequest {
            product_id: product.id.clone(),
            quantity,
            sale_price_cents,
        }
    }

    fn request(customer_id: &str, delivery: i64, lines: Vec<OrderLineRequest>) -> OrderRequest {
        OrderRequest {
            customer_id: customer_id.to_string(),
            delivery_charge_cents: delivery,
            lines,
        }
    }

    async fn table_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_worked_example() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        let order = scope
            .orders()
            .create(&request(&buyer.id, 1000, vec![line(&p1, 3, 2500)]))
            .await
            .unwrap();

        assert_eq!(order.total_price_cents, 8500);
        assert_eq!(order.status, "Pending");
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 2);

        let items = scope.orders().items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].sale_price_cents, 2500);
        assert_eq!(items[0].unit_cost_cents, 1760);
        assert_eq!(items[0].sku_snapshot, "P1");

        // Second order for 10 of the remaining 2
        let err = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 10, 2500)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 2);
        assert_eq!(scope.orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_total_is_lines_plus_delivery() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 50).await;
        let p2 = product(&scope, "P2", 50).await;
        let buyer = customer(&scope, "0100").await;

        let order = scope
            .orders()
            .create(&request(
                &buyer.id,
                350,
                vec![line(&p1, 4, 1999), line(&p2, 7, 105), line(&p1, 1, 0)],
            ))
            .await
            .unwrap();

        let items = scope.orders().items(&order.id).await.unwrap();
        let lines_total: i64 = items.iter().map(|i| i.quantity * i.sale_price_cents).sum();
        assert_eq!(order.total_price_cents, lines_total + order.delivery_charge_cents);
        assert_eq!(order.total_price_cents, 4 * 1999 + 7 * 105 + 350);
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 45);
    }

    #[tokio::test]
    async fn test_second_line_failure_rolls_back_first() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let plenty = product(&scope, "PLENTY", 10).await;
        let scarce = product(&scope, "SCARCE", 1).await;
        let buyer = customer(&scope, "0100").await;

        let err = scope
            .orders()
            .create(&request(
                &buyer.id,
                0,
                vec![line(&plenty, 4, 100), line(&scarce, 2, 100)],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));
        assert_eq!(scope.ledger().stock_level(&plenty.id).await.unwrap(), 10);
        assert_eq!(scope.ledger().stock_level(&scarce.id).await.unwrap(), 1);
        assert_eq!(table_count(&db, "orders").await, 0);
        assert_eq!(table_count(&db, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        let missing = OrderLineRequest {
            product_id: "no-such-product".to_string(),
            quantity: 1,
            sale_price_cents: 100,
        };
        let err = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 2, 100), missing]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 5);
        assert_eq!(table_count(&db, "orders").await, 0);
    }

    #[tokio::test]
    async fn test_oversized_sale_price_rejected_without_touching_stock() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        // 90,000,000,000,000,000.00 × 2 does not fit in i64 cents
        let err = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 2, 9_000_000_000_000_000_000)]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 5);
        assert_eq!(table_count(&db, "orders").await, 0);
        assert_eq!(table_count(&db, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_largest_accepted_line_totals_exactly() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let bulk = product(&scope, "BULK", MAX_LINE_QUANTITY).await;
        let buyer = customer(&scope, "0100").await;

        let order = scope
            .orders()
            .create(&request(
                &buyer.id,
                MAX_MONEY_CENTS,
                vec![line(&bulk, MAX_LINE_QUANTITY, MAX_MONEY_CENTS)],
            ))
            .await
            .unwrap();

        assert_eq!(order.total_price_cents, 10_000_100_000_000_000);
        assert_eq!(scope.ledger().stock_level(&bulk.id).await.unwrap(), 0);

        let report = scope.reports().sales_report(CostBasis::Snapshot).await.unwrap();
        assert_eq!(report.total_sales_cents, 10_000_100_000_000_000);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let buyer = customer(&scope, "0100").await;

        let err = scope
            .orders()
            .create(&request(&buyer.id, 500, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyOrder)));
        assert_eq!(table_count(&db, "orders").await, 0);
    }

    #[tokio::test]
    async fn test_customer_checked_before_lines() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));

        let err = scope
            .orders()
            .create(&request("no-such-customer", 0, Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cross_tenant_order_rejected() {
        let db = database().await;
        let acme = db.tenant(&tenant("acme"));
        let globex = db.tenant(&tenant("globex"));

        let acme_product = product(&acme, "P1", 5).await;
        let acme_customer = customer(&acme, "0100").await;
        let globex_product = product(&globex, "G1", 5).await;
        let globex_customer = customer(&globex, "0100").await;

        // Foreign customer
        let err = acme
            .orders()
            .create(&request(&globex_customer.id, 0, vec![line(&acme_product, 1, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        // Foreign product
        let err = acme
            .orders()
            .create(&request(&acme_customer.id, 0, vec![line(&globex_product, 1, 100)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::NotFound { .. })));

        assert_eq!(globex.ledger().stock_level(&globex_product.id).await.unwrap(), 5);
        assert_eq!(acme.ledger().stock_level(&acme_product.id).await.unwrap(), 5);
        assert_eq!(table_count(&db, "orders").await, 0);
    }

    #[tokio::test]
    async fn test_sale_price_snapshot_survives_product_edit() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        let order = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 1, 2500)]))
            .await
            .unwrap();

        let mut edited = widget_input("P1", 4);
        edited.wholesale_price_cents = 99_900;
        scope.products().update(&p1.id, &edited).await.unwrap();

        let detail = scope.orders().detail(&order.id).await.unwrap();
        assert_eq!(detail.order.total_price_cents, 2500);
        assert_eq!(detail.items[0].sale_price_cents, 2500);
        assert_eq!(detail.items[0].unit_cost_cents, 1760);
        assert_eq!(detail.customer.id, buyer.id);
    }

    #[tokio::test]
    async fn test_update_status_open_string() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;
        let order = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 2, 100)]))
            .await
            .unwrap();

        let updated = scope
            .orders()
            .update_status(&order.id, "  Awaiting courier ")
            .await
            .unwrap();
        assert_eq!(updated.status, "Awaiting courier");
        assert_eq!(updated.total_price_cents, order.total_price_cents);
        // Status changes never touch stock
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 3);

        assert!(matches!(
            scope.orders().update_status(&order.id, "   ").await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));
        assert!(matches!(
            db.tenant(&tenant("globex"))
                .orders()
                .update_status(&order.id, "Shipped")
                .await,
            Err(DbError::Domain(CoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_scoped() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 50).await;
        let buyer = customer(&scope, "0100").await;

        let first = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 1, 100)]))
            .await
            .unwrap();
        let second = scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 2, 100), line(&p1, 1, 100)]))
            .await
            .unwrap();

        let listed = scope.orders().list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[0].item_count, 2);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[1].customer_name, buyer.name);

        assert!(db.tenant(&tenant("globex")).orders().list().await.unwrap().is_empty());
        assert!(db
            .tenant(&tenant("globex"))
            .orders()
            .items(&first.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_form_data_offers_in_stock_only() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        product(&scope, "EMPTY", 0).await;
        product(&scope, "FULL", 3).await;
        customer(&scope, "0100").await;

        let form = scope.orders().form_data().await.unwrap();
        assert_eq!(form.customers.len(), 1);
        assert_eq!(form.products.len(), 1);
        assert_eq!(form.products[0].sku, "FULL");
        assert!(form.suggested_statuses.contains(&"Pending".to_string()));
    }

    #[tokio::test]
    async fn test_customer_delete_cascades_orders() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 50).await;
        let buyer = customer(&scope, "0100").await;
        let bystander = customer(&scope, "0200").await;

        for _ in 0..2 {
            scope
                .orders()
                .create(&request(&buyer.id, 0, vec![line(&p1, 1, 100), line(&p1, 2, 100)]))
                .await
                .unwrap();
        }
        scope
            .orders()
            .create(&request(&bystander.id, 0, vec![line(&p1, 1, 100)]))
            .await
            .unwrap();
        assert_eq!(table_count(&db, "order_items").await, 5);

        scope.customers().delete(&buyer.id).await.unwrap();

        assert_eq!(table_count(&db, "orders").await, 1);
        assert_eq!(table_count(&db, "order_items").await, 1);
        assert!(scope.customers().find(&buyer.id).await.unwrap().is_none());
        // Stock is not restored by deleting history
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 43);
    }

    #[tokio::test]
    async fn test_referenced_product_delete_restricted() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;
        scope
            .orders()
            .create(&request(&buyer.id, 0, vec![line(&p1, 1, 100)]))
            .await
            .unwrap();

        assert!(matches!(
            scope.products().delete(&p1.id).await,
            Err(DbError::Domain(CoreError::DeleteRestricted { .. }))
        ));
        assert!(scope.products().find(&p1.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sequential_orders_never_oversell() {
        let db = Arc::new(database().await);
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = Arc::clone(&db);
            let req = request(&buyer.id, 0, vec![line(&p1, 1, 100)]);
            handles.push(tokio::spawn(async move {
                db.tenant(&tenant("acme")).orders().create(&req).await
            }));
        }

        let mut committed = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                committed += 1;
            }
        }

        assert_eq!(committed, 5);
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 0);
    }

    /// File-backed pool with several connections racing on one product.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_orders_never_oversell() {
        let path = std::env::temp_dir().join(format!("stockbook-race-{}.db", uuid::Uuid::new_v4()));
        let db = Arc::new(
            Database::new(DbConfig::new(&path).max_connections(4))
                .await
                .unwrap(),
        );
        let scope = db.tenant(&tenant("acme"));
        let p1 = product(&scope, "P1", 5).await;
        let buyer = customer(&scope, "0100").await;

        let mut handles = Vec::new();
        for _ in 0..12 {
            let db = Arc::clone(&db);
            let req = request(&buyer.id, 0, vec![line(&p1, 1, 100)]);
            handles.push(tokio::spawn(async move {
                db.tenant(&tenant("acme")).orders().create(&req).await
            }));
        }

        let mut committed = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => insufficient += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(committed, 5);
        assert_eq!(insufficient, 7);
        assert_eq!(scope.ledger().stock_level(&p1.id).await.unwrap(), 0);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
