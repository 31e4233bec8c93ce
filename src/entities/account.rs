//! Account entity - A ledger account holding a balance in one currency.
//!
//! The balance is never stored: it is the sum of the account's entries.
//! Owners and admins are kept in `account_members`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g. "House credits")
    pub name: String,
    /// Currency code or community unit the entries are denominated in
    pub currency: String,
    /// When the account was opened
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many entries
    #[sea_orm(has_many = "super::entry::Entity")]
    Entries,
    /// One account has many owners and admins
    #[sea_orm(has_many = "super::account_member::Entity")]
    Members,
}

impl Related<super::entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl Related<super::account_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
