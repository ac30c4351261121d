//! # Repository Module
//!
//! Tenant-scoped repositories for Stockbook.
//!
//! ## Tenant Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Tenant-Scoped Repository Pattern                     │
//! │                                                                         │
//! │  Handler                                                               │
//! │       │                                                                 │
//! │       │  db.tenant(&tenant_id)                                         │
//! │       ▼                                                                 │
//! │  TenantScope { pool, tenant_id }                                       │
//! │       │                                                                 │
//! │       ├── products()   → ProductRepository                             │
//! │       ├── customers()  → CustomerRepository                            │
//! │       ├── suppliers()  → SupplierRepository                            │
//! │       ├── ledger()     → InventoryLedger                               │
//! │       ├── orders()     → OrderRepository (order engine)                │
//! │       └── reports()    → ReportRepository                              │
//! │                                                                         │
//! │  Every repository carries the tenant id and applies it to every        │
//! │  statement, directly (tenant_id = ?) or through a join to the          │
//! │  tenant-owned parent (orders → customers, payments → suppliers).       │
//! │  A row owned by another tenant is indistinguishable from a missing     │
//! │  row: both are NotFound.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod delete;
pub mod ledger;
pub mod order;
pub mod product;
pub mod report;
pub mod supplier;

use sqlx::SqlitePool;
use stockbook_core::TenantId;
use uuid::Uuid;

use customer::CustomerRepository;
use ledger::InventoryLedger;
use order::OrderRepository;
use product::ProductRepository;
use report::ReportRepository;
use supplier::SupplierRepository;

/// Column list matching `stockbook_core::Product`.
pub(crate) const PRODUCT_COLUMNS: &str = "id, tenant_id, supplier_id, sku, name, quantity, \
     wholesale_price_cents, import_charge_cents, total_weight_milli, \
     per_weight_cost_cents, domestic_charge_cents, created_at, updated_at";

/// Column list matching `stockbook_core::Order`.
pub(crate) const ORDER_COLUMNS: &str =
    "id, customer_id, status, delivery_charge_cents, total_price_cents, created_at, updated_at";

/// Helper to generate a new row ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Every repository for one tenant.
#[derive(Debug, Clone)]
pub struct TenantScope {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl TenantScope {
    pub(crate) fn new(pool: SqlitePool, tenant_id: TenantId) -> Self {
        TenantScope { pool, tenant_id }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn suppliers(&self) -> SupplierRepository {
        SupplierRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn ledger(&self) -> InventoryLedger {
        InventoryLedger::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone(), self.tenant_id.clone())
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(self.pool.clone(), self.tenant_id.clone())
    }
}

// =============================================================================
// Test Fixtures
// =============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use stockbook_core::{Customer, CustomerInput, Product, ProductInput, Supplier, SupplierInput, TenantId};

    use crate::{Database, DbConfig, TenantScope};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub fn tenant(name: &str) -> TenantId {
        TenantId::new(name).unwrap()
    }

    /// quantity 5, costs as in the worked example: unit cost 17.60.
    pub fn widget_input(sku: &str, quantity: i64) -> ProductInput {
        ProductInput {
            sku: sku.to_string(),
            name: format!("Widget {}", sku),
            supplier_id: None,
            quantity,
            wholesale_price_cents: 1000,
            import_charge_cents: 2000,
            total_weight_milli: 2000,
            per_weight_cost_cents: 500,
            domestic_charge_cents: 800,
        }
    }

    pub async fn product(scope: &TenantScope, sku: &str, quantity: i64) -> Product {
        scope
            .products()
            .insert(&widget_input(sku, quantity))
            .await
            .unwrap()
    }

    pub async fn customer(scope: &TenantScope, phone: &str) -> Customer {
        scope
            .customers()
            .insert(&CustomerInput {
                name: format!("Customer {}", phone),
                phone: phone.to_string(),
                address: None,
            })
            .await
            .unwrap()
    }

    pub async fn supplier(scope: &TenantScope, phone: &str) -> Supplier {
        scope
            .suppliers()
            .insert(&SupplierInput {
                name: format!("Supplier {}", phone),
                contact_person: None,
                phone: phone.to_string(),
                address: None,
            })
            .await
            .unwrap()
    }
}
