//! # stockbook-db: Database Layer for Stockbook
//!
//! SQLite persistence for the inventory, order and costing engine, through
//! `sqlx`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /orders/create)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stockbook-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  TenantScope  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │───►│ OrderRepo     │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs on   │    │ Ledger        │    │ _schema.sql  │  │   │
//! │  │   │               │    │ ReportRepo .. │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./stockbook.db (STOCKBOOK_DB_PATH)                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Tenant-scoped repositories, ledger and order engine
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stockbook_core::TenantId;
//! use stockbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/stockbook.db")).await?;
//!
//! let shop = db.tenant(&TenantId::new("acme")?);
//! let order = shop.orders().create(&request).await?;
//! let report = shop.reports().sales_report(CostBasis::Snapshot).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{generate_id, TenantScope};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::ledger::{reserve_stock, InventoryLedger, Reservation};
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::supplier::SupplierRepository;
