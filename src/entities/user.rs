//! User entity - A member of the community.
//!
//! Users own and administer accounts, book stays, organize and attend events,
//! and hold roles at locations. Authentication happens upstream; this table
//! only records who they are.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, as forwarded by the authenticating proxy
    #[sea_orm(unique)]
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name, used for ordering occupant lists
    pub last_name: String,
    /// Delivery address for all outbound mail
    pub email: String,
    /// Superusers pass every group check
    pub is_superuser: bool,
    /// Inactive users are treated as anonymous
    pub is_active: bool,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many group memberships
    #[sea_orm(has_many = "super::user_group::Entity")]
    Groups,
    /// One user has many stays
    #[sea_orm(has_many = "super::stay::Entity")]
    Stays,
}

impl Related<super::user_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl Related<super::stay::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
