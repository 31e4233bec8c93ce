//! Location role entity - Who administers, lives at, or runs events at a location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role a user holds at a location
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LocationRoleKind {
    /// Manages bookings and receives the admin list mail
    #[sea_orm(string_value = "house_admin")]
    HouseAdmin,
    /// Can see admin pages without changing anything
    #[sea_orm(string_value = "readonly_admin")]
    ReadonlyAdmin,
    /// Lives at the location
    #[sea_orm(string_value = "resident")]
    Resident,
    /// Reviews events and may post to the announce list
    #[sea_orm(string_value = "event_admin")]
    EventAdmin,
}

/// Role assignment row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_roles")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location the role applies to
    pub location_id: i64,
    /// Person holding the role
    pub user_id: i64,
    /// Which role
    pub role: LocationRoleKind,
}

/// Each role joins one location and one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// The role holder
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
