//! Stay entity - A booking of a resource at a location for a date range.
//!
//! `arrive` and `depart` are calendar dates in the location's local time.
//! Only confirmed stays count as occupancy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a booking request
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum StayStatus {
    /// Requested, waiting for an admin
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by an admin, not yet paid or confirmed
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Confirmed; the guest is expected
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Withdrawn by the guest or declined
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// Stay database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stays")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location of the stay
    pub location_id: i64,
    /// Room or bed booked
    pub resource_id: i64,
    /// Guest
    pub user_id: i64,
    /// First night
    pub arrive: Date,
    /// Departure day
    pub depart: Date,
    /// Booking status
    pub status: StayStatus,
    /// Why the guest is coming
    pub purpose: String,
    /// Free-form notes for the admins
    pub comments: Option<String>,
}

/// Each stay belongs to a location, resource and user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// The booked resource
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::Id"
    )]
    Resource,
    /// The guest
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

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
