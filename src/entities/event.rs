//! Event entity - Something happening at a location.
//!
//! `start` and `end` are stored in UTC; reminder windows convert the
//! deployment's local calendar day into UTC bounds before querying.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review state of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Published
    #[sea_orm(string_value = "live")]
    Live,
    /// Submitted, waiting for an event admin
    #[sea_orm(string_value = "waiting for approval")]
    WaitingForApproval,
    /// Shared with the event admins for comments
    #[sea_orm(string_value = "seeking feedback")]
    SeekingFeedback,
    /// Called off
    #[sea_orm(string_value = "canceled")]
    Canceled,
}

/// Who can see an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed publicly and in weekly digests
    #[sea_orm(string_value = "public")]
    Public,
    /// Invitation only
    #[sea_orm(string_value = "private")]
    Private,
    /// Members of the community only
    #[sea_orm(string_value = "community")]
    Community,
}

/// Event database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location hosting the event
    pub location_id: i64,
    /// User who submitted it
    pub creator_id: i64,
    /// Title shown in listings and subjects
    pub title: String,
    /// URL component
    pub slug: String,
    /// Long description
    pub description: String,
    /// Start time (UTC)
    pub start: DateTimeUtc,
    /// End time (UTC)
    pub end: DateTimeUtc,
    /// Review state
    pub status: EventStatus,
    /// Audience
    pub visibility: Visibility,
    /// When it was submitted
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Event and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The hosting location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
    /// Attendees and organizers
    #[sea_orm(has_many = "super::event_participant::Entity")]
    Participants,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::event_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
