//! # Costing Calculator
//!
//! Landed cost of a product, derived from its multi-stage import costing
//! attributes. Pure and stateless.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Q = quantity            W = wholesale price per unit                 │
//! │   I = import charge       T = total weight (milli-units)               │
//! │   R = inland cost/unit    D = domestic delivery charge                 │
//! │                                                                         │
//! │   inland      = round(T × R / 1000)                                    │
//! │   total       = (Q × W) + I + D + inland                               │
//! │   unit cost   = round(total / Q)        (0 when Q == 0)                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Inputs are expected to be non-negative; `ProductInput::validated`
//! rejects negative and oversized values before a product is ever stored.
//! Every step is checked regardless, and overflow surfaces as
//! `ValidationError::OutOfRange` naming the step.

use serde::{Deserialize, Serialize};

use crate::money::{amount_overflow, Money};
use crate::types::Weight;
use crate::validation::ValidationResult;

/// Milli-units per whole weight unit.
const WEIGHT_SCALE: i64 = 1000;

/// Costing attributes of one product at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostingInputs {
    pub quantity: i64,
    pub wholesale_price: Money,
    pub import_charge: Money,
    pub total_weight: Weight,
    pub per_weight_cost: Money,
    pub domestic_charge: Money,
}

impl CostingInputs {
    /// `T × R`, with T in milli-units.
    pub fn inland_transport_cost(&self) -> ValidationResult<Money> {
        self.per_weight_cost
            .multiply_ratio(self.total_weight.milli(), WEIGHT_SCALE)
            .ok_or_else(|| amount_overflow("inland_transport_cost"))
    }

    /// `Q × W`
    pub fn purchase_cost(&self) -> ValidationResult<Money> {
        self.wholesale_price
            .checked_mul(self.quantity)
            .ok_or_else(|| amount_overflow("purchase_cost"))
    }

    /// `(Q × W) + I + D + inland`
    pub fn total_landed_cost(&self) -> ValidationResult<Money> {
        Money::checked_sum([
            self.purchase_cost()?,
            self.import_charge,
            self.domestic_charge,
            self.inland_transport_cost()?,
        ])
        .ok_or_else(|| amount_overflow("total_landed_cost"))
    }

    /// Landed cost per unit. Zero for an empty stock, never a division by zero.
    pub fn unit_cost(&self) -> ValidationResult<Money> {
        if self.quantity == 0 {
            return Ok(Money::zero());
        }
        Ok(self.total_landed_cost()?.divide_rounded(self.quantity))
    }
}
