//! Event participant entity - Attendees and organizers of an event.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a user takes part in an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// RSVP'd
    #[sea_orm(string_value = "attendee")]
    Attendee,
    /// Runs the event
    #[sea_orm(string_value = "organizer")]
    Organizer,
}

/// Participation row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_participants")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The event
    pub event_id: i64,
    /// The participant
    pub user_id: i64,
    /// Attendee or organizer
    pub role: ParticipantRole,
}

/// Each row joins one event and one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
    /// The participant
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
