//! Invoice item entity - One frozen line of an invoice.
//!
//! The unit price is copied from the product at checkout time; later product
//! edits must not alter what was invoiced.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Invoice this line belongs to
    pub invoice_id: i64,
    /// Product this line was created from
    pub product_id: i64,
    /// Invoiced quantity, at least 1
    pub quantity: i64,
    /// Unit price at the instant of checkout
    pub unit_price: f64,
}

/// Defines relationships between InvoiceItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
    /// Each line references the product it was created from
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
