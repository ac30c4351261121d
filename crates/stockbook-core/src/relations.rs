//! # Deletion Policy
//!
//! Every parent/child relationship and what deleting the parent does to
//! its children, declared once.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customer ──CASCADE──► Order ──CASCADE──► OrderItem                    │
//! │                                              ▲                         │
//! │  Supplier ──RESTRICT─► Product ──RESTRICT────┘                         │
//! │     │                                                                   │
//! │     └──────CASCADE──► SupplierPayment                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `Cascade` and `Nullify` are carried out by the schema's `ON DELETE`
//! clauses; `Restrict` is checked by the delete executor in `stockbook-db`
//! before anything is removed.

use std::fmt;

/// What happens to children when their parent is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Children are deleted with the parent.
    Cascade,
    /// Deletion fails while children exist.
    Restrict,
    /// Children survive with the foreign key cleared.
    Nullify,
}

impl DeletePolicy {
    /// The matching SQL `ON DELETE` action.
    pub fn sql_action(&self) -> &'static str {
        match self {
            DeletePolicy::Cascade => "CASCADE",
            DeletePolicy::Restrict => "RESTRICT",
            DeletePolicy::Nullify => "SET NULL",
        }
    }
}

/// Persisted entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Product,
    Supplier,
    SupplierPayment,
    Customer,
    Order,
    OrderItem,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Product => "products",
            Entity::Supplier => "suppliers",
            Entity::SupplierPayment => "supplier_payments",
            Entity::Customer => "customers",
            Entity::Order => "orders",
            Entity::OrderItem => "order_items",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Product => "Product",
            Entity::Supplier => "Supplier",
            Entity::SupplierPayment => "SupplierPayment",
            Entity::Customer => "Customer",
            Entity::Order => "Order",
            Entity::OrderItem => "OrderItem",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One foreign key: `child.foreign_key` references `parent.id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub parent: Entity,
    pub child: Entity,
    pub foreign_key: &'static str,
    pub policy: DeletePolicy,
}

/// Every relationship in the schema.
pub const RELATIONS: &[Relation] = &[
    Relation {
        parent: Entity::Customer,
        child: Entity::Order,
        foreign_key: "customer_id",
        policy: DeletePolicy::Cascade,
    },
    Relation {
        parent: Entity::Order,
        child: Entity::OrderItem,
        foreign_key: "order_id",
        policy: DeletePolicy::Cascade,
    },
    Relation {
        parent: Entity::Supplier,
        child: Entity::SupplierPayment,
        foreign_key: "supplier_id",
        policy: DeletePolicy::Cascade,
    },
    Relation {
        parent: Entity::Supplier,
        child: Entity::Product,
        foreign_key: "supplier_id",
        policy: DeletePolicy::Restrict,
    },
    Relation {
        parent: Entity::Product,
        child: Entity::OrderItem,
        foreign_key: "product_id",
        policy: DeletePolicy::Restrict,
    },
];

/// Relations in which `parent` is the referenced side.
pub fn children_of(parent: Entity) -> impl Iterator<Item = &'static Relation> {
    RELATIONS.iter().filter(move |r| r.parent == parent)
}

/// Relations that block deleting `parent` while children exist.
pub fn restrictions_on(parent: Entity) -> impl Iterator<Item = &'static Relation> {
    children_of(parent).filter(|r| r.policy == DeletePolicy::Restrict)
}
