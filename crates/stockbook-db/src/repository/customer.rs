//! # Customer Repository
//!
//! Tenant-scoped customer CRUD. Deleting a customer cascades to its orders
//! and their items.

use chrono::Utc;
use sqlx::SqlitePool;
use stockbook_core::{Customer, CustomerDetail, CustomerInput, Entity, Order, TenantId};
use tracing::{debug, info};

use super::{delete, generate_id, ORDER_COLUMNS};
use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, tenant_id, name, phone, address, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl CustomerRepository {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        CustomerRepository { pool, tenant_id }
    }

    /// All customers of the tenant, by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        debug!(tenant = %self.tenant_id, "Listing customers");

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE tenant_id = ?1 ORDER BY name, phone",
            CUSTOMER_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {} FROM customers WHERE id = ?1 AND tenant_id = ?2",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> DbResult<Customer> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Customer with their orders, newest first.
    pub async fn detail(&self, id: &str) -> DbResult<CustomerDetail> {
        let customer = self.get(id).await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE customer_id = ?1 ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .bind(&customer.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(CustomerDetail { customer, orders })
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(Duplicate)` - phone already used by another of the tenant's customers
    pub async fn insert(&self, input: &CustomerInput) -> DbResult<Customer> {
        let input = input.validated()?;
        debug!(tenant = %self.tenant_id, "Inserting customer");

        let now = Utc::now();
        let customer = Customer {
            id: generate_id(),
            tenant_id: self.tenant_id.as_str().to_string(),
            name: input.name,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO customers (id, tenant_id, name, phone, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.tenant_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("phone", &customer.phone))?;

        info!(tenant = %self.tenant_id, id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Replaces name, phone and address.
    pub async fn update(&self, id: &str, input: &CustomerInput) -> DbResult<Customer> {
        let input = input.validated()?;

        let updated = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET name = ?3, phone = ?4, address = ?5, updated_at = ?6
            WHERE id = ?1 AND tenant_id = ?2
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("phone", &input.phone))?;

        updated.ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer together with all of their orders and order items.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete::delete_owned(&self.pool, &self.tenant_id, Entity::Customer, id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE tenant_id = ?1")
            .bind(self.tenant_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use stockbook_core::{CoreError, CustomerInput, ValidationError};

    use crate::DbError;

    #[tokio::test]
    async fn test_insert_trims_and_lists() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));

        let created = scope
            .customers()
            .insert(&CustomerInput {
                name: "  Karim  ".to_string(),
                phone: " 01711000000 ".to_string(),
                address: Some("".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Karim");
        assert_eq!(created.phone, "01711000000");
        assert!(created.address.is_none());
        assert_eq!(scope.customers().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_phone_unique_per_tenant() {
        let db = database().await;
        let acme = db.tenant(&tenant("acme"));
        customer(&acme, "0100").await;

        let err = acme
            .customers()
            .insert(&CustomerInput {
                name: "Someone else".to_string(),
                phone: "0100".to_string(),
                address: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));

        // Another tenant may reuse the number
        customer(&db.tenant(&tenant("globex")), "0100").await;
    }

    #[tokio::test]
    async fn test_update_and_tenant_isolation() {
        let db = database().await;
        let acme = db.tenant(&tenant("acme"));
        let created = customer(&acme, "0100").await;

        let input = CustomerInput {
            name: "Renamed".to_string(),
            phone: "0200".to_string(),
            address: Some("Dhaka".to_string()),
        };

        let globex = db.tenant(&tenant("globex"));
        assert!(matches!(
            globex.customers().update(&created.id, &input).await,
            Err(DbError::Domain(CoreError::NotFound { .. }))
        ));
        assert!(globex.customers().list().await.unwrap().is_empty());

        let updated = acme.customers().update(&created.id, &input).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.address.as_deref(), Some("Dhaka"));
    }

    #[tokio::test]
    async fn test_detail_without_orders() {
        let db = database().await;
        let scope = db.tenant(&tenant("acme"));
        let created = customer(&scope, "0100").await;

        let detail = scope.customers().detail(&created.id).await.unwrap();
        assert_eq!(detail.customer.id, created.id);
        assert!(detail.orders.is_empty());
    }
}
