//! Location email template entity - Per-location override of a built-in email.
//!
//! When a row exists for (location, key) its bodies replace the built-in
//! template for that key. Either body may be absent.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Override database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_email_templates")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location the override applies to
    pub location_id: i64,
    /// Template key, see `mail::templates::EmailKey`
    pub key: String,
    /// Plain text body with `{{ placeholder }}` markers
    pub text_body: Option<String>,
    /// HTML body with `{{ placeholder }}` markers
    pub html_body: Option<String>,
}

/// Each override belongs to one location
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The location
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::Id"
    )]
    Location,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
