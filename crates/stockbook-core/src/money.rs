//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Landed cost spreads fixed charges over the stock on hand:             │
//! │    88.00 / 5 = 17.6  → fine                                            │
//! │    10.00 / 3 = 3.333… → which cent do we keep?                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + explicit rounding                       │
//! │    8800 / 5 = 1760 cents (exact)                                       │
//! │    1000 / 3 = 333 cents (rounded half away from zero, in i128)         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(2500);         // 25.00
//! let line = price.checked_mul(3).unwrap();    // 75.00
//! assert_eq!(line.cents(), 7500);
//!
//! // Arithmetic that would leave i64 yields None instead of wrapping
//! assert!(Money::from_cents(i64::MAX).checked_mul(2).is_none());
//!
//! // Form input is parsed without ever touching f64
//! assert_eq!(Money::parse_decimal("17.6", "price").unwrap().cents(), 1760);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::MAX_MONEY_CENTS;

/// Minor units per major unit (cents per whole currency unit).
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: profit can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as a bare integer**: the wire format is cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts `other`, `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Multiplies by a quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let sale_price = Money::from_cents(2500);
    /// assert_eq!(sale_price.checked_mul(3).unwrap().cents(), 7500);
    /// assert!(Money::from_cents(i64::MAX / 2).checked_mul(3).is_none());
    /// ```
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, `None` as soon as the running total overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Multiplies by `numerator / denominator`, rounding half away from zero.
    ///
    /// Used for rate × measured-quantity products such as
    /// `per_weight_cost × weight_milli / 1000`. The intermediate product is
    /// taken in i128; `None` when the rounded result does not fit in cents.
    ///
    /// Returns zero when `denominator` is zero.
    pub fn multiply_ratio(&self, numerator: i64, denominator: i64) -> Option<Money> {
        if denominator == 0 {
            return Some(Money::zero());
        }
        let product = self.0 as i128 * numerator as i128;
        i64::try_from(div_round_half_away(product, denominator as i128))
            .ok()
            .map(Money::from_cents)
    }

    /// Divides into `parts` equal shares, rounding half away from zero.
    ///
    /// Returns zero when `parts` is zero.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(8800).divide_rounded(5).cents(), 1760);
    /// assert_eq!(Money::from_cents(1000).divide_rounded(3).cents(), 333);
    /// assert_eq!(Money::from_cents(8800).divide_rounded(0).cents(), 0);
    /// ```
    pub fn divide_rounded(&self, parts: i64) -> Money {
        if parts == 0 {
            return Money::zero();
        }
        Money::from_cents(div_round_half_away(self.0 as i128, parts as i128) as i64)
    }

    /// Parses a non-negative decimal string (`"25"`, `"17.6"`, `"0.05"`).
    ///
    /// ## Rules
    /// - Digits with at most one `.` and at most two decimal places
    /// - No sign, no exponent, no thousands separators
    /// - Surrounding whitespace is ignored
    /// - At most `MAX_MONEY_CENTS`
    ///
    /// `field` names the input in the returned `ValidationError`.
    pub fn parse_decimal(input: &str, field: &str) -> Result<Money, ValidationError> {
        let cents = parse_fixed_point(input, field, 2)?;
        if cents > MAX_MONEY_CENTS {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                min: 0,
                max: MAX_MONEY_CENTS,
            });
        }
        Ok(Money::from_cents(cents))
    }
}

/// Error for a computed amount that left the representable range.
pub(crate) fn amount_overflow(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
}

/// Integer division rounding half away from zero.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator.abs() {
        if (numerator < 0) != (denominator < 0) {
            quotient - 1
        } else {
            quotient + 1
        }
    } else {
        quotient
    }
}

/// Parses an unsigned decimal with up to `scale` fractional digits into an
/// integer of `10^scale` minor units.
pub(crate) fn parse_fixed_point(input: &str, field: &str, scale: u32) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if trimmed.starts_with('-') {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("must be a number"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("must be a number"));
    }
    if fraction.len() > scale as usize {
        return Err(invalid(&format!("at most {} decimal places", scale)));
    }

    let multiplier = 10_i64.pow(scale);
    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid("number is too large"))?
    };
    let padded = format!("{:0<width$}", fraction, width = scale as usize);
    let fraction_value: i64 = if padded.is_empty() {
        0
    } else {
        padded.parse().map_err(|_| invalid("must be a number"))?
    };

    whole_value
        .checked_mul(multiplier)
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or_else(|| invalid("number is too large"))
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with two decimals, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
