//! User entity - Represents an account with role-based access.
//!
//! Each user carries a unique email, an Argon2 password hash, a role
//! (ADMIN or CLIENT), and an `active` flag. Inactive users keep their rows
//! but can no longer authenticate.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role, stored under its canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Role {
    /// Full catalog, user, and invoice management access
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Regular shopper
    #[sea_orm(string_value = "CLIENT")]
    Client,
}

impl Role {
    /// Parses the canonical spelling, returning `None` for anything outside
    /// {`ADMIN`, `CLIENT`}.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Self::Admin),
            "CLIENT" => Some(Self::Client),
            _ => None,
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across all accounts
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2id hash of the password; plaintext is never stored
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Whether the account may authenticate
    pub active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user owns at most one cart
    #[sea_orm(has_many = "super::cart::Entity")]
    Cart,
    /// A user owns any number of invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoice,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
