//! # Sales Reporting
//!
//! Aggregates a tenant's order history into sales, cost of goods sold and
//! profit.
//!
//! ## Cost Basis
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Snapshot (default)                                                    │
//! │    COGS = Σ item.quantity × item.unit_cost_cents                       │
//! │    Unit cost frozen when the order was created; edits to a product     │
//! │    never change past reports.                                          │
//! │                                                                         │
//! │  Live                                                                  │
//! │    COGS = Σ item.quantity × unit_cost(product at its current state)    │
//! │    Figures drift when a product's costing fields or stock change.     │
//! │                                                                         │
//! │  Both: profit = total_sales − COGS, where total_sales = Σ total_price  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{amount_overflow, Money};
use crate::types::{OrderItem, Product};

/// Which unit cost the cost-of-goods figure is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CostBasis {
    /// Unit cost stored on the order item at creation.
    #[default]
    Snapshot,
    /// Unit cost recomputed from the product's current attributes.
    Live,
}

impl CostBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostBasis::Snapshot => "snapshot",
            CostBasis::Live => "live",
        }
    }
}

impl fmt::Display for CostBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostBasis {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(CostBasis::Snapshot),
            "live" => Ok(CostBasis::Live),
            _ => Err(ValidationError::InvalidFormat {
                field: "basis".to_string(),
                reason: "must be 'snapshot' or 'live'".to_string(),
            }),
        }
    }
}

/// Quantity sold and the unit cost charged against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostedLine {
    pub quantity: i64,
    pub unit_cost: Money,
}

impl CostedLine {
    /// Uses the unit cost frozen on the item.
    pub fn snapshot(item: &OrderItem) -> Self {
        CostedLine {
            quantity: item.quantity,
            unit_cost: item.unit_cost(),
        }
    }

    /// Recomputes the unit cost from the product as it is now.
    pub fn live(quantity: i64, product: &Product) -> Result<Self, ValidationError> {
        Ok(CostedLine {
            quantity,
            unit_cost: product.unit_cost()?,
        })
    }

    #[inline]
    pub fn cost(&self) -> Result<Money, ValidationError> {
        self.unit_cost
            .checked_mul(self.quantity)
            .ok_or_else(|| amount_overflow("cost_of_goods"))
    }
}

/// Aggregate totals for one tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    pub basis: CostBasis,
    pub order_count: i64,
    pub total_sales_cents: i64,
    pub total_cogs_cents: i64,
    /// Negative when selling at a loss.
    pub profit_cents: i64,
}

impl SalesReport {
    /// Builds the report from order totals and costed item lines.
    ///
    /// An empty history yields all-zero totals. A total that does not fit
    /// in i64 cents is an `OutOfRange` error rather than a wrapped figure.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::{CostBasis, CostedLine, Money, SalesReport};
    ///
    /// let report = SalesReport::compute(
    ///     CostBasis::Snapshot,
    ///     [Money::from_cents(8500)],
    ///     [CostedLine { quantity: 3, unit_cost: Money::from_cents(1760) }],
    /// )
    /// .unwrap();
    /// assert_eq!(report.total_cogs_cents, 5280);
    /// assert_eq!(report.profit_cents, 3220);
    /// ```
    pub fn compute(
        basis: CostBasis,
        order_totals: impl IntoIterator<Item = Money>,
        lines: impl IntoIterator<Item = CostedLine>,
    ) -> Result<Self, ValidationError> {
        let mut order_count = 0;
        let mut total_sales = Money::zero();
        for total in order_totals {
            order_count += 1;
            total_sales = total_sales
                .checked_add(total)
                .ok_or_else(|| amount_overflow("total_sales"))?;
        }

        let mut total_cogs = Money::zero();
        for line in lines {
            total_cogs = total_cogs
                .checked_add(line.cost()?)
                .ok_or_else(|| amount_overflow("total_cogs"))?;
        }

        let profit = total_sales
            .checked_sub(total_cogs)
            .ok_or_else(|| amount_overflow("profit"))?;

        Ok(SalesReport {
            basis,
            order_count,
            total_sales_cents: total_sales.cents(),
            total_cogs_cents: total_cogs.cents(),
            profit_cents: profit.cents(),
        })
    }

    #[inline]
    pub fn total_sales(&self) -> Money {
        Money::from_cents(self.total_sales_cents)
    }

    #[inline]
    pub fn total_cogs(&self) -> Money {
        Money::from_cents(self.total_cogs_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(quantity: i64, unit_cost_cents: i64) -> OrderItem {
        OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            sku_snapshot: "P1".to_string(),
            name_snapshot: "Widget".to_string(),
            quantity,
            sale_price_cents: 2500,
            unit_cost_cents,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_cost_basis_parse() {
        assert_eq!("snapshot".parse::<CostBasis>().unwrap(), CostBasis::Snapshot);
        assert_eq!(" LIVE ".parse::<CostBasis>().unwrap(), CostBasis::Live);
        assert!("average".parse::<CostBasis>().is_err());
        assert_eq!(CostBasis::default(), CostBasis::Snapshot);
        assert_eq!(CostBasis::Live.to_string(), "live");
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let report = SalesReport::compute(CostBasis::Snapshot, Vec::new(), Vec::new()).unwrap();
        assert_eq!(report.order_count, 0);
        assert!(report.total_sales().is_zero());
        assert!(report.total_cogs().is_zero());
        assert!(report.profit().is_zero());
    }

    #[test]
    fn test_profit_is_sales_minus_cogs() {
        let lines = [item(3, 1760), item(2, 500)].iter().map(CostedLine::snapshot).collect::<Vec<_>>();
        let report = SalesReport::compute(
            CostBasis::Snapshot,
            [Money::from_cents(8500), Money::from_cents(1200)],
            lines,
        )
        .unwrap();

        assert_eq!(report.order_count, 2);
        assert_eq!(report.total_sales_cents, 9700);
        assert_eq!(report.total_cogs_cents, 5280 + 1000);
        assert_eq!(
            report.profit_cents,
            report.total_sales_cents - report.total_cogs_cents
        );
    }

    #[test]
    fn test_loss_is_negative_profit() {
        let report = SalesReport::compute(
            CostBasis::Live,
            [Money::from_cents(100)],
            [CostedLine {
                quantity: 1,
                unit_cost: Money::from_cents(400),
            }],
        )
        .unwrap();
        assert_eq!(report.profit_cents, -300);
    }

    #[test]
    fn test_overflowing_totals_are_errors() {
        let sales = SalesReport::compute(
            CostBasis::Snapshot,
            [Money::from_cents(i64::MAX), Money::from_cents(1)],
            Vec::new(),
        );
        assert!(matches!(sales, Err(ValidationError::OutOfRange { ref field, .. }) if field == "total_sales"));

        let cogs = SalesReport::compute(
            CostBasis::Live,
            Vec::new(),
            [CostedLine {
                quantity: 3,
                unit_cost: Money::from_cents(i64::MAX / 2),
            }],
        );
        assert!(matches!(cogs, Err(ValidationError::OutOfRange { ref field, .. }) if field == "cost_of_goods"));
    }
}
