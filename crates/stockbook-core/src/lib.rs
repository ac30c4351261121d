//! # stockbook-core: Pure Business Logic for Stockbook
//!
//! This crate holds the order-fulfillment and costing rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Stockbook Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/web (axum)                              │   │
//! │  │    order form ──► status update ──► reports ──► dashboard       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ stockbook-core (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │ costing  │  │  order   │  │  report  │  │  relations   │   │   │
//! │  │   │ landed   │  │  draft   │  │  sales   │  │  cascade /   │   │   │
//! │  │   │ unit cost│  │  totals  │  │  COGS    │  │  restrict    │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 stockbook-db (Database Layer)                   │   │
//! │  │      tenant scope, inventory ledger, order engine, reports      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`costing`] - Landed unit cost of a product
//! - [`order`] - Order requests, drafting and totals
//! - [`report`] - Sales / cost-of-goods / profit aggregation
//! - [`relations`] - Per-relationship deletion policy
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use stockbook_core::costing::CostingInputs;
//! use stockbook_core::{Money, Weight};
//!
//! let inputs = CostingInputs {
//!     quantity: 5,
//!     wholesale_price: Money::from_cents(1000),
//!     import_charge: Money::from_cents(2000),
//!     total_weight: Weight::from_units(2),
//!     per_weight_cost: Money::from_cents(500),
//!     domestic_charge: Money::from_cents(800),
//! };
//!
//! // ((5 × 10.00) + 20.00 + 8.00 + (2 × 5.00)) / 5 = 17.60
//! assert_eq!(inputs.unit_cost().unwrap().cents(), 1760);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod error;
pub mod money;
pub mod order;
pub mod relations;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use costing::CostingInputs;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{OrderDraft, OrderLineRequest, OrderRequest};
pub use relations::{DeletePolicy, Entity, Relation, RELATIONS};
pub use report::{CostBasis, CostedLine, SalesReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Status given to every newly committed order.
pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// Statuses offered by the UI. Status is an open string; these are hints only.
pub const SUGGESTED_ORDER_STATUSES: &[&str] = &["Pending", "Shipped", "Delivered", "Cancelled"];

/// Maximum length of an order status string.
pub const MAX_STATUS_LEN: usize = 50;

/// Stock level below which a product counts as "low stock".
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Catches typos (an extra zero or two) before stock is touched.
pub const MAX_LINE_QUANTITY: i64 = 100_000;

/// Maximum number of lines accepted in one order.
pub const MAX_ORDER_LINES: usize = 200;
