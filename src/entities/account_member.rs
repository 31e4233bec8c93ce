//! Account member entity - Links users to accounts as owners or admins.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a user relates to an account
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// Holds the account; may view it and transfer out of it
    #[sea_orm(string_value = "owner")]
    Owner,
    /// Manages the account on behalf of its owners
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Membership row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_members")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account being shared
    pub account_id: i64,
    /// Member user
    pub user_id: i64,
    /// Owner or admin
    pub role: AccountRole,
}

/// Each membership joins one account and one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    /// The member
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
