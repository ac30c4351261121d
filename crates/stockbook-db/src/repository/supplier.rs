//! # Supplier Repository
//!
//! Tenant-scoped suppliers, their payments and the outstanding balance.
//!
//! ## Balance
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  total_due = Σ landed cost of the supplier's products (current state)  │
//! │            − Σ payments recorded against the supplier                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payments carry no tenant column; every payment query joins through
//! `suppliers.tenant_id`.

use chrono::Utc;
use sqlx::SqlitePool;
use stockbook_core::{
    Entity, NewSupplierPayment, Supplier, SupplierBalance, SupplierDetail, SupplierInput,
    SupplierPayment, TenantId,
};
use tracing::{debug, info};

use super::product::ProductRepository;
use super::{delete, generate_id};
use crate::error::{DbError, DbResult};

const SUPPLIER_COLUMNS: &str =
    "id, tenant_id, name, contact_person, phone, address, created_at, updated_at";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl SupplierRepository {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        SupplierRepository { pool, tenant_id }
    }

    /// All suppliers of the tenant, by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        debug!(tenant = %self.tenant_id, "Listing suppliers");

        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE tenant_id = ?1 ORDER BY name, phone",
            SUPPLIER_COLUMNS
        ))
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    pub async fn find(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE id = ?1 AND tenant_id = ?2",
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn get(&self, id: &str) -> DbResult<Supplier> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    pub async fn insert(&self, input: &SupplierInput) -> DbResult<Supplier> {
        let input = input.validated()?;
        debug!(tenant = %self.tenant_id, "Inserting supplier");

        let now = Utc::now();
        let supplier = Supplier {
            id: generate_id(),
            tenant_id: self.tenant_id.as_str().to_string(),
            name: input.name,
            contact_person: input.contact_person,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, tenant_id, name, contact_person, phone, address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.tenant_id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("phone", &supplier.phone))?;

        info!(tenant = %self.tenant_id, id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn update(&self, id: &str, input: &SupplierInput) -> DbResult<Supplier> {
        let input = input.validated()?;

        let updated = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers SET
                name = ?3, contact_person = ?4, phone = ?5, address = ?6, updated_at = ?7
            WHERE id = ?1 AND tenant_id = ?2
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(id)
        .bind(self.tenant_id.as_str())
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).on_unique("phone", &input.phone))?;

        updated.ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Deletes a supplier and its payments.
    ///
    /// Fails with `DeleteRestricted` while any product references it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        delete::delete_owned(&self.pool, &self.tenant_id, Entity::Supplier, id).await
    }

    /// Records a payment to one of the tenant's suppliers.
    ///
    /// `payment_date` defaults to today (UTC).
    pub async fn record_payment(
        &self,
        supplier_id: &str,
        input: &NewSupplierPayment,
    ) -> DbResult<SupplierPayment> {
        let input = input.validated()?;
        let now = Utc::now();

        let payment = SupplierPayment {
            id: generate_id(),
            supplier_id: supplier_id.to_string(),
            amount_cents: input.amount_cents,
            payment_date: input.payment_date.unwrap_or_else(|| now.date_naive()),
            notes: input.notes,
            created_at: now,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO supplier_payments (id, supplier_id, amount_cents, payment_date, notes, created_at)
            SELECT ?1, s.id, ?3, ?4, ?5, ?6
            FROM suppliers s
            WHERE s.id = ?2 AND s.tenant_id = ?7
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.supplier_id)
        .bind(payment.amount_cents)
        .bind(payment.payment_date)
        .bind(&payment.notes)
        .bind(now)
        .bind(self.tenant_id.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", supplier_id));
        }

        info!(
            tenant = %self.tenant_id,
            supplier_id = %supplier_id,
            amount_cents = payment.amount_cents,
            "Supplier payment recorded"
        );
        Ok(payment)
    }

    /// Payments to a supplier, most recent first.
    pub async fn payments(&self, supplier_id: &str) -> DbResult<Vec<SupplierPayment>> {
        self.get(supplier_id).await?;

        let payments = sqlx::query_as::<_, SupplierPayment>(
            r#"
            SELECT sp.id, sp.supplier_id, sp.amount_cents, sp.payment_date, sp.notes, sp.created_at
            FROM supplier_payments sp
            JOIN suppliers s ON s.id = sp.supplier_id
            WHERE sp.supplier_id = ?1 AND s.tenant_id = ?2
            ORDER BY sp.payment_date DESC, sp.created_at DESC
            "#,
        )
        .bind(supplier_id)
        .bind(self.tenant_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// What is still owed to the supplier.
    pub async fn balance(&self, supplier_id: &str) -> DbResult<SupplierBalance> {
        let products = self.products().list_by_supplier(supplier_id).await?;
        let payments = self.payments(supplier_id).await?;
        Ok(SupplierBalance::compute(&products, &payments)?)
    }

    /// Supplier with products, payments and balance.
    pub async fn detail(&self, id: &str) -> DbResult<SupplierDetail> {
        let supplier = self.get(id).await?;
        let products = self.products().list_by_supplier(id).await?;
        let payments = self.payments(id).await?;
        let balance = SupplierBalance::compute(&products, &payments)?;

        Ok(SupplierDetail {
            supplier,
            products,
            payments,
            balance,
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE tenant_id = ?1")
            .bind(self.tenant_id.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.tenant_id.clone())
    }
}
