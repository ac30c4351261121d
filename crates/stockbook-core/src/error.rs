//! # Error Types
//!
//! Domain-specific error types for stockbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockbook-core errors (this file)                                     │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Malformed or out-of-range input                │
//! │                                                                         │
//! │  stockbook-db errors (separate crate)                                  │
//! │  └── DbError          - Wraps CoreError + database failures            │
//! │                                                                         │
//! │  apps/web errors                                                       │
//! │  └── ApiError         - What the client sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tenant Enumeration
//! `NotFound` is returned both when an entity does not exist and when it
//! belongs to another tenant. The two cases carry identical messages.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant aborts the operation that raised it; nothing partial is
/// ever persisted alongside one of these.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity absent, or owned by another tenant.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requested quantity exceeds the product's on-hand stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line (P1 × 10)
    ///      │
    ///      ▼
    /// Reserve stock: available=2
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "P1", available: 2, requested: 10 }
    ///      │
    ///      ▼
    /// Whole order rolled back, form shows "Not enough stock for P1 ..."
    /// ```
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// An order was submitted with no line items.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// Deleting the entity would orphan rows under a restrict relationship.
    #[error("Cannot delete {entity} {id}: still referenced by {dependents} {dependent_entity} record(s)")]
    DeleteRestricted {
        entity: String,
        id: String,
        dependent_entity: String,
        dependents: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any stock is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Repeated form fields that must line up do not.
    #[error("{fields} must have the same number of entries")]
    LengthMismatch { fields: String },

    /// Duplicate value (e.g., duplicate SKU within a tenant).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
