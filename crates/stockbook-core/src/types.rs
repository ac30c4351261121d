//! # Domain Types
//!
//! Core domain types used throughout Stockbook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │   Tenant (TenantId) ── owns ──┬──────────────┬───────────────┐         │
//! │                               │              │               │         │
//! │                               ▼              ▼               ▼         │
//! │                      ┌──────────────┐ ┌────────────┐ ┌──────────────┐  │
//! │                      │   Supplier   │ │  Product   │ │   Customer   │  │
//! │                      │ name, phone  │ │ sku, qty   │ │ name, phone  │  │
//! │                      └──────┬───────┘ │ costing…   │ └──────┬───────┘  │
//! │                             │         └─────┬──────┘        │          │
//! │                             ▼               │               ▼          │
//! │                   ┌──────────────────┐      │        ┌─────────────┐   │
//! │                   │ SupplierPayment  │      │        │    Order    │   │
//! │                   │ amount, date     │      │        │ status,     │   │
//! │                   └──────────────────┘      │        │ total_price │   │
//! │                                             │        └──────┬──────┘   │
//! │                                             │               ▼          │
//! │                                             │        ┌─────────────┐   │
//! │                                             └───────►│  OrderItem  │   │
//! │                                                      │ qty, prices │   │
//! │                                                      └─────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Inheritance
//! Products, suppliers and customers carry `tenant_id` directly. Orders,
//! order items and supplier payments inherit their tenant through the
//! customer / supplier they hang off.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::costing::CostingInputs;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{amount_overflow, parse_fixed_point, Money};
use crate::validation::{ValidationResult, MAX_WEIGHT_MILLI};

/// Thousandths of a weight unit per whole unit.
const MILLI_PER_UNIT: i64 = 1000;

// =============================================================================
// Tenant Identity
// =============================================================================

/// The acting tenant. Every repository call is parameterised by one.
///
/// No `Default`: a tenant id only comes from an authenticated token or an
/// explicit constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TenantId(String);

impl TenantId {
    /// Maximum accepted length of a tenant identifier.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a tenant identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "tenant_id".to_string(),
            });
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::TooLong {
                field: "tenant_id".to_string(),
                max: Self::MAX_LEN,
            });
        }
        if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(ValidationError::InvalidFormat {
                field: "tenant_id".to_string(),
                reason: "must not contain whitespace".to_string(),
            });
        }

        Ok(TenantId(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Weight
// =============================================================================

/// Shipment weight in thousandths of the single supported weight unit.
///
/// ## Why Milli-Units?
/// Same reason as `Money`: `2.5` units is stored as `2500`, so the inland
/// transport cost `weight × rate` stays in integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Weight(i64);

impl Weight {
    #[inline]
    pub const fn from_milli(milli: i64) -> Self {
        Weight(milli)
    }

    /// Whole units, e.g. `Weight::from_units(2)` is 2.000.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Weight(units * MILLI_PER_UNIT)
    }

    #[inline]
    pub const fn milli(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Weight(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parses a non-negative decimal with at most three decimal places.
    ///
    /// ```rust
    /// use stockbook_core::Weight;
    ///
    /// assert_eq!(Weight::parse_decimal("2.5", "weight").unwrap().milli(), 2500);
    /// assert!(Weight::parse_decimal("0.0001", "weight").is_err());
    /// assert!(Weight::parse_decimal("10000000.001", "weight").is_err());
    /// ```
    pub fn parse_decimal(input: &str, field: &str) -> Result<Weight, ValidationError> {
        let milli = parse_fixed_point(input, field, 3)?;
        if milli > MAX_WEIGHT_MILLI {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: MAX_WEIGHT_MILLI,
            });
        }
        Ok(Weight::from_milli(milli))
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:03}", sign, abs / MILLI_PER_UNIT, abs % MILLI_PER_UNIT)
    }
}

impl Default for Weight {
    fn default() -> Self {
        Weight::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stocked product with its multi-stage import costing attributes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Supplier the stock was bought from, if recorded.
    pub supplier_id: Option<String>,

    /// Stock Keeping Unit, unique per tenant.
    pub sku: String,

    pub name: String,

    /// On-hand stock. Never negative after a committed operation.
    pub quantity: i64,

    /// Wholesale price per unit, in cents.
    pub wholesale_price_cents: i64,

    /// One-time import delivery charge for the whole shipment, in cents.
    pub import_charge_cents: i64,

    /// Total shipment weight, in milli-units.
    pub total_weight_milli: i64,

    /// Inland transport cost per whole weight unit, in cents.
    pub per_weight_cost_cents: i64,

    /// Domestic delivery charge for the whole shipment, in cents.
    pub domestic_charge_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn wholesale_price(&self) -> Money {
        Money::from_cents(self.wholesale_price_cents)
    }

    #[inline]
    pub fn total_weight(&self) -> Weight {
        Weight::from_milli(self.total_weight_milli)
    }

    /// Snapshot of the costing attributes at the product's current state.
    pub fn costing(&self) -> CostingInputs {
        CostingInputs {
            quantity: self.quantity,
            wholesale_price: self.wholesale_price(),
            import_charge: Money::from_cents(self.import_charge_cents),
            total_weight: self.total_weight(),
            per_weight_cost: Money::from_cents(self.per_weight_cost_cents),
            domestic_charge: Money::from_cents(self.domestic_charge_cents),
        }
    }

    /// Landed cost of the whole current stock.
    #[inline]
    pub fn total_landed_cost(&self) -> ValidationResult<Money> {
        self.costing().total_landed_cost()
    }

    /// Landed cost of one unit; zero when out of stock.
    #[inline]
    pub fn unit_cost(&self) -> ValidationResult<Money> {
        self.costing().unit_cost()
    }

    /// `quantity < threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.quantity < threshold
    }

    /// Checks whether `requested` units can be taken from stock.
    ///
    /// The database applies the same rule atomically; this is the
    /// in-memory statement of it.
    pub fn check_reservation(&self, requested: i64) -> CoreResult<()> {
        if requested > self.quantity {
            return Err(CoreError::InsufficientStock {
                sku: self.sku.clone(),
                available: self.quantity,
                requested,
            });
        }
        Ok(())
    }
}

/// Editable product fields, used for both create and full update.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductInput {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub supplier_id: Option<String>,
    pub quantity: i64,
    pub wholesale_price_cents: i64,
    #[serde(default)]
    pub import_charge_cents: i64,
    #[serde(default)]
    pub total_weight_milli: i64,
    #[serde(default)]
    pub per_weight_cost_cents: i64,
    #[serde(default)]
    pub domestic_charge_cents: i64,
}

impl ProductInput {
    /// Checks every field and returns a normalised copy (trimmed text,
    /// empty supplier id treated as none).
    pub fn validated(&self) -> Result<ProductInput, ValidationError> {
        use crate::validation::*;

        validate_sku(&self.sku)?;
        validate_product_name(&self.name)?;
        validate_stock_quantity(self.quantity)?;
        validate_cost_cents("wholesale_price", self.wholesale_price_cents)?;
        validate_cost_cents("import_charge", self.import_charge_cents)?;
        validate_weight_milli(self.total_weight_milli)?;
        validate_cost_cents("per_weight_cost", self.per_weight_cost_cents)?;
        validate_cost_cents("domestic_charge", self.domestic_charge_cents)?;

        let supplier_id = match self.supplier_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(id) => {
                validate_uuid("supplier_id", id)?;
                Some(id.to_string())
            }
        };

        Ok(ProductInput {
            sku: self.sku.trim().to_string(),
            name: self.name.trim().to_string(),
            supplier_id,
            ..self.clone()
        })
    }
}

/// Name, SKU and stock level, as shown in "top products by stock".
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockLevel {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
}

// =============================================================================
// Customer
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Unique per tenant.
    pub phone: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl CustomerInput {
    pub fn validated(&self) -> Result<CustomerInput, ValidationError> {
        use crate::validation::*;

        validate_name("name", &self.name, 200)?;
        validate_phone(&self.phone)?;

        Ok(CustomerInput {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: optional_text("address", self.address.as_deref(), 500)?,
        })
    }
}

// =============================================================================
// Supplier
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub contact_person: Option<String>,
    /// Unique per tenant.
    pub phone: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    pub phone: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl SupplierInput {
    pub fn validated(&self) -> Result<SupplierInput, ValidationError> {
        use crate::validation::*;

        validate_name("name", &self.name, 200)?;
        validate_phone(&self.phone)?;

        Ok(SupplierInput {
            name: self.name.trim().to_string(),
            contact_person: optional_text("contact_person", self.contact_person.as_deref(), 200)?,
            phone: self.phone.trim().to_string(),
            address: optional_text("address", self.address.as_deref(), 500)?,
        })
    }
}

/// A payment made to a supplier. Tenant is inherited from the supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SupplierPayment {
    pub id: String,
    pub supplier_id: String,
    /// Always positive.
    pub amount_cents: i64,
    #[ts(as = "String")]
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SupplierPayment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplierPayment {
    pub amount_cents: i64,
    /// Defaults to today when absent.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewSupplierPayment {
    pub fn validated(&self) -> Result<NewSupplierPayment, ValidationError> {
        use crate::validation::*;

        validate_payment_amount(self.amount_cents)?;

        Ok(NewSupplierPayment {
            amount_cents: self.amount_cents,
            payment_date: self.payment_date,
            notes: optional_text("notes", self.notes.as_deref(), 1000)?,
        })
    }
}

/// What the tenant still owes a supplier.
///
/// `total_due = Σ product landed cost (current state) − Σ payments`.
/// Negative when the supplier has been overpaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierBalance {
    pub total_landed_cost_cents: i64,
    pub total_paid_cents: i64,
    pub total_due_cents: i64,
}

impl SupplierBalance {
    pub fn compute(products: &[Product], payments: &[SupplierPayment]) -> ValidationResult<Self> {
        let landed = products
            .iter()
            .map(Product::total_landed_cost)
            .collect::<ValidationResult<Vec<_>>>()?;
        let landed = Money::checked_sum(landed).ok_or_else(|| amount_overflow("total_landed_cost"))?;
        let paid = Money::checked_sum(payments.iter().map(SupplierPayment::amount))
            .ok_or_else(|| amount_overflow("total_paid"))?;
        let due = landed
            .checked_sub(paid)
            .ok_or_else(|| amount_overflow("total_due"))?;

        Ok(SupplierBalance {
            total_landed_cost_cents: landed.cents(),
            total_paid_cents: paid.cents(),
            total_due_cents: due.cents(),
        })
    }

    #[inline]
    pub fn total_due(&self) -> Money {
        Money::from_cents(self.total_due_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order. `total_price_cents` is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    /// Open string; "Pending" on creation.
    pub status: String,
    pub delivery_charge_cents: i64,
    /// Σ(quantity × sale price) + delivery charge.
    pub total_price_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn delivery_charge(&self) -> Money {
        Money::from_cents(self.delivery_charge_cents)
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// One line of a committed order, with price snapshots taken at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// SKU at time of sale.
    pub sku_snapshot: String,
    /// Product name at time of sale.
    pub name_snapshot: String,
    pub quantity: i64,
    /// Sale price per unit at time of sale.
    pub sale_price_cents: i64,
    /// Landed unit cost of the product just before the stock was reserved.
    pub unit_cost_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    #[inline]
    pub fn unit_cost(&self) -> Money {
        Money::from_cents(self.unit_cost_cents)
    }
}

/// Order row for listings, joined with its customer's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderSummary {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub status: String,
    pub delivery_charge_cents: i64,
    pub total_price_cents: i64,
    pub item_count: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierDetail {
    pub supplier: Supplier,
    pub products: Vec<Product>,
    pub payments: Vec<SupplierPayment>,
    pub balance: SupplierBalance,
}

/// Everything the order form needs: customers and in-stock products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderFormData {
    pub customers: Vec<Customer>,
    /// Only products with `quantity > 0`.
    pub products: Vec<Product>,
    pub suggested_statuses: Vec<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    pub product_count: i64,
    pub supplier_count: i64,
    pub customer_count: i64,
    pub low_stock_threshold: i64,
    pub low_stock_count: i64,
    pub low_stock_products: Vec<Product>,
    /// Five products with the most stock.
    pub top_stocked: Vec<StockLevel>,
    /// Five most recently created products.
    pub recent_products: Vec<Product>,
}

// =============================================================================
// Unit Tests
// =============================================================================
