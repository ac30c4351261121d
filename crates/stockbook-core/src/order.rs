//! # Order Drafting
//!
//! The pure half of the order engine: decoding an order request, checking
//! its shape, and accumulating line snapshots and totals. Stock reservation
//! and persistence live in `stockbook-db`.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   OrderRequest ──validate──► OrderDraft ──(all lines reserved)──►      │
//! │        │                        │                   COMMITTED           │
//! │        │                        │                                       │
//! │        └── EmptyOrder /         └── NotFound / InsufficientStock ──►   │
//! │            ValidationError                          ABORTED             │
//! │                                                  (nothing persisted)    │
//! │                                                                         │
//! │   total_price = Σ(quantity × sale_price) + delivery_charge             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{amount_overflow, Money};
use crate::types::Product;
use crate::validation::{validate_cost_cents, validate_line_quantity};
use crate::MAX_ORDER_LINES;

// =============================================================================
// Request
// =============================================================================

/// One requested line: product, quantity, and the agreed unit sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub sale_price_cents: i64,
}

impl OrderLineRequest {
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }
}

/// A request to create an order for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderRequest {
    pub customer_id: String,
    #[serde(default)]
    pub delivery_charge_cents: i64,
    pub lines: Vec<OrderLineRequest>,
}

impl OrderRequest {
    /// Decodes the url-encoded order form.
    ///
    /// ## Fields
    /// - `customer_id`
    /// - `delivery_charge` (decimal, blank means 0)
    /// - repeated `product_id[]`, `quantity[]`, `sale_price[]` of equal length
    ///
    /// Bracket-less names (`product_id`, ...) are accepted too.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::OrderRequest;
    ///
    /// let pairs: Vec<(String, String)> = [
    ///     ("customer_id", "c1"),
    ///     ("delivery_charge", "10"),
    ///     ("product_id[]", "p1"),
    ///     ("quantity[]", "3"),
    ///     ("sale_price[]", "25"),
    /// ]
    /// .iter()
    /// .map(|(k, v)| (k.to_string(), v.to_string()))
    /// .collect();
    ///
    /// let request = OrderRequest::from_form_pairs(&pairs).unwrap();
    /// assert_eq!(request.delivery_charge_cents, 1000);
    /// assert_eq!(request.lines[0].sale_price_cents, 2500);
    /// ```
    pub fn from_form_pairs(pairs: &[(String, String)]) -> Result<OrderRequest, ValidationError> {
        let mut customer_id = None;
        let mut delivery_charge = None;
        let mut product_ids = Vec::new();
        let mut quantities = Vec::new();
        let mut sale_prices = Vec::new();

        for (key, value) in pairs {
            match key.trim_end_matches("[]") {
                "customer_id" => customer_id = Some(value.trim().to_string()),
                "delivery_charge" => delivery_charge = Some(value.as_str()),
                "product_id" => product_ids.push(value.trim().to_string()),
                "quantity" => quantities.push(value.as_str()),
                "sale_price" => sale_prices.push(value.as_str()),
                _ => {}
            }
        }

        let customer_id = match customer_id {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(ValidationError::Required {
                    field: "customer_id".to_string(),
                })
            }
        };

        let delivery_charge = match delivery_charge.map(str::trim) {
            None | Some("") => Money::zero(),
            Some(raw) => Money::parse_decimal(raw, "delivery_charge")?,
        };

        if product_ids.len() != quantities.len() || product_ids.len() != sale_prices.len() {
            return Err(ValidationError::LengthMismatch {
                fields: "product_id, quantity and sale_price".to_string(),
            });
        }

        let lines = product_ids
            .into_iter()
            .zip(quantities)
            .zip(sale_prices)
            .map(|((product_id, quantity), sale_price)| {
                let quantity = quantity
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::InvalidFormat {
                        field: "quantity".to_string(),
                        reason: "must be a whole number".to_string(),
                    })?;
                let sale_price = Money::parse_decimal(sale_price, "sale_price")?;

                Ok(OrderLineRequest {
                    product_id,
                    quantity,
                    sale_price_cents: sale_price.cents(),
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(OrderRequest {
            customer_id,
            delivery_charge_cents: delivery_charge.cents(),
            lines,
        })
    }

    #[inline]
    pub fn delivery_charge(&self) -> Money {
        Money::from_cents(self.delivery_charge_cents)
    }

    /// Checks the request shape. Runs after the customer has been resolved.
    ///
    /// ## Errors
    /// - `EmptyOrder` when there are no lines
    /// - `Validation` for a bad quantity, negative price, or too many lines
    pub fn validate(&self) -> CoreResult<()> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        if self.lines.len() > MAX_ORDER_LINES {
            return Err(ValidationError::OutOfRange {
                field: "order lines".to_string(),
                min: 1,
                max: MAX_ORDER_LINES as i64,
            }
            .into());
        }

        validate_cost_cents("delivery_charge", self.delivery_charge_cents)?;

        for line in &self.lines {
            if line.product_id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "product_id".to_string(),
                }
                .into());
            }
            validate_line_quantity(line.quantity)?;
            validate_cost_cents("sale_price", line.sale_price_cents)?;
        }

        Ok(())
    }
}

// =============================================================================
// Draft
// =============================================================================

/// A line whose stock has been reserved, with its snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub quantity: i64,
    pub sale_price: Money,
    /// Landed unit cost before the reservation.
    pub unit_cost: Money,
}

impl DraftLine {
    /// quantity × sale price
    #[inline]
    pub fn line_total(&self) -> Result<Money, ValidationError> {
        self.sale_price
            .checked_mul(self.quantity)
            .ok_or_else(|| amount_overflow("line_total"))
    }
}

/// An order being assembled inside the creation transaction.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    delivery_charge: Money,
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new(delivery_charge: Money) -> Self {
        OrderDraft {
            delivery_charge,
            lines: Vec::new(),
        }
    }

    /// Records a reserved line.
    ///
    /// `product` must be the product as it was *before* the reservation so
    /// the unit cost snapshot reflects the stock the units came from.
    ///
    /// Fails without recording the line when its total or the running
    /// order total would overflow.
    pub fn add_line(&mut self, product: &Product, line: &OrderLineRequest) -> CoreResult<&DraftLine> {
        let draft_line = DraftLine {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            name: product.name.clone(),
            quantity: line.quantity,
            sale_price: line.sale_price(),
            unit_cost: product.unit_cost()?,
        };
        let line_total = draft_line.line_total()?;
        self.total_price()?
            .checked_add(line_total)
            .ok_or_else(|| amount_overflow("total_price"))?;

        self.lines.push(draft_line);
        Ok(&self.lines[self.lines.len() - 1])
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    #[inline]
    pub fn delivery_charge(&self) -> Money {
        self.delivery_charge
    }

    /// Σ(quantity × sale price)
    pub fn items_total(&self) -> Result<Money, ValidationError> {
        let totals = self
            .lines
            .iter()
            .map(DraftLine::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        Money::checked_sum(totals).ok_or_else(|| amount_overflow("items_total"))
    }

    /// items total + delivery charge
    pub fn total_price(&self) -> Result<Money, ValidationError> {
        self.items_total()?
            .checked_add(self.delivery_charge)
            .ok_or_else(|| amount_overflow("total_price"))
    }
}
