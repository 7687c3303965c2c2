//! Invoice entity - A persisted order created from a cart at checkout.
//!
//! The invoice stores a computed total and owns a set of `invoice_item`
//! lines frozen at checkout time. The optional idempotency key lets a client
//! retry a checkout without producing a second invoice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an invoice, stored under its canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvoiceStatus {
    /// Created at checkout, awaiting payment
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Payment received
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Cancelled by an administrator
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl InvoiceStatus {
    /// Parses the canonical spelling, returning `None` for unknown values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(Self::Pending),
            "PAID" => Some(Self::Paid),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Lifecycle state
    pub status: InvoiceStatus,
    /// Sum of unit price times quantity across all lines
    pub total: f64,
    /// Client-supplied key that makes checkout retries safe
    pub idempotency_key: Option<String>,
    /// When the invoice was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// An invoice owns its snapshot lines
    #[sea_orm(has_many = "super::invoice_item::Entity")]
    InvoiceItem,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::invoice_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
