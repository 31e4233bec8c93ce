//! Event notification entity - A user's reminder preference.
//!
//! Users without a row get the default (reminders on).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Preference database model, keyed by user
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_notifications")]
pub struct Model {
    /// The user the preference belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Whether to send the "your events today" reminder
    pub reminders: bool,
}

/// Each preference belongs to one user
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
