//! # Validation Module
//!
//! Input validation utilities for Stockbook.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (apps/web)                                      │
//! │  ├── Form / JSON decoding                                              │
//! │  └── Decimal parsing (Money::parse_decimal, Weight::parse_decimal)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business rule validation                                          │
//! │  └── Runs before any stock is touched                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  ├── UNIQUE (tenant_id, sku) / (tenant_id, phone)                      │
//! │  └── Foreign key actions                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::validation::{validate_sku, validate_line_quantity};
//!
//! validate_sku("COKE-330").unwrap();
//! validate_line_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_STATUS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum SKU length.
pub const MAX_SKU_LEN: usize = 100;

/// Maximum product name length.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Maximum phone number length.
pub const MAX_PHONE_LEN: usize = 30;

/// Largest single amount accepted from input, in cents (1,000,000,000.00).
///
/// ## Headroom
/// ```text
/// Q × W      ≤ MAX_STOCK_QUANTITY × MAX_MONEY_CENTS      = 1e18
/// T × R      ≤ MAX_WEIGHT_MILLI / 1000 × MAX_MONEY_CENTS  = 1e18
/// + I + D    ≤ 2 × MAX_MONEY_CENTS
/// ─────────────────────────────────────────────────────────────
/// landed     < 2.1e18 < i64::MAX (≈ 9.2e18)
/// ```
/// Order lines are bounded the same way by `MAX_LINE_QUANTITY` and
/// `MAX_ORDER_LINES`.
pub const MAX_MONEY_CENTS: i64 = 100_000_000_000;

/// Largest on-hand stock a product may record.
pub const MAX_STOCK_QUANTITY: i64 = 10_000_000;

/// Largest shipment weight, in milli-units (10,000,000.000 units).
pub const MAX_WEIGHT_MILLI: i64 = 10_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
/// - Only letters, digits, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_sku;
///
/// assert!(validate_sku("COKE-330").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(101).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates a required free-text name of at most `max` characters.
pub fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty, at most 30 characters
/// - Digits, spaces, `-`, `(`, `)`, optional leading `+`
/// - At least one digit
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > MAX_PHONE_LEN {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LEN,
        });
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'));

    if !allowed || !body.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, hyphens and parentheses".to_string(),
        });
    }

    Ok(())
}

/// Normalises optional text: trims, maps blank to `None`, enforces `max`.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        Some(text) => Ok(Some(text.to_string())),
    }
}

/// Validates and normalises an order status.
///
/// Status is an open string: any trimmed, non-empty value of at most 50
/// characters is accepted.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_status;
///
/// assert_eq!(validate_status("  Shipped ").unwrap(), "Shipped");
/// assert_eq!(validate_status("Awaiting pickup").unwrap(), "Awaiting pickup");
/// assert!(validate_status("   ").is_err());
/// ```
pub fn validate_status(status: &str) -> ValidationResult<String> {
    let status = status.trim();

    if status.is_empty() {
        return Err(ValidationError::Required {
            field: "status".to_string(),
        });
    }

    if status.chars().count() > MAX_STATUS_LEN {
        return Err(ValidationError::TooLong {
            field: "status".to_string(),
            max: MAX_STATUS_LEN,
        });
    }

    Ok(status.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates the quantity of one order line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order form: one line                                                   │
/// │                                                                         │
/// │  quantity[] = 3                                                        │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_line_quantity(3) ← THIS FUNCTION                             │
/// │       │                                                                 │
/// │       ├── qty <= 0? → "quantity must be positive"                      │
/// │       │                                                                 │
/// │       ├── qty > max? → "quantity must be between 1 and 100000"         │
/// │       │                                                                 │
/// │       └── OK → stock reservation                                       │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates on-hand stock entered for a product (zero allowed).
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    validate_bounded("quantity", qty, MAX_STOCK_QUANTITY)
}

/// Validates a cost or price in cents. Zero is allowed.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_cost_cents;
///
/// assert!(validate_cost_cents("sale_price", 2500).is_ok());
/// assert!(validate_cost_cents("sale_price", 0).is_ok());
/// assert!(validate_cost_cents("sale_price", -100).is_err());
/// assert!(validate_cost_cents("sale_price", i64::MAX).is_err());
/// ```
pub fn validate_cost_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if Money::from_cents(cents).is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    validate_bounded(field, cents, MAX_MONEY_CENTS)
}

/// Validates a shipment weight in milli-units.
pub fn validate_weight_milli(milli: i64) -> ValidationResult<()> {
    validate_bounded("total_weight", milli, MAX_WEIGHT_MILLI)
}

/// Validates a supplier payment amount. Must be positive.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    validate_bounded("amount", cents, MAX_MONEY_CENTS)
}

/// `0..=max`, with a distinct error for negatives.
fn validate_bounded(field: &str, value: i64, max: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("customer_id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("customer_id", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
