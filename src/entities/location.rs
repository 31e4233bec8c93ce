//! Location entity - A house in the network.
//!
//! Each location has its own people (admins, residents), stays, events and
//! mailing-list addresses under `{slug}.{list_domain}`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// URL and mail-domain component (e.g. `"redvic"`)
    #[sea_orm(unique)]
    pub slug: String,
    /// Display name
    pub name: String,
    /// Short tag put in brackets at the start of every subject line
    pub email_subject_prefix: String,
}

/// Defines relationships between Location and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// People with a role at this location
    #[sea_orm(has_many = "super::location_role::Entity")]
    Roles,
    /// Stays booked here
    #[sea_orm(has_many = "super::stay::Entity")]
    Stays,
    /// Events held here
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::location_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Roles.def()
    }
}

impl Related<super::stay::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stays.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
