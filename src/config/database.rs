//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to generate SQL statements from the entity models, so the database schema always
//! matches the Rust struct definitions without hand-written SQL.

use crate::entities::{
    Account, AccountMember, Entry, Event, EventNotification, EventParticipant, LedgerTransaction,
    Location, LocationEmailTemplate, LocationRole, Resource, Stay, User, UserGroup,
    WeeklySubscription,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::debug;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/hearth.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default
/// local `SQLite` file if it is not set.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet, parents before children.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, UserGroup).await?;
    create_table(db, &schema, Account).await?;
    create_table(db, &schema, AccountMember).await?;
    create_table(db, &schema, LedgerTransaction).await?;
    create_table(db, &schema, Entry).await?;
    create_table(db, &schema, Location).await?;
    create_table(db, &schema, LocationRole).await?;
    create_table(db, &schema, LocationEmailTemplate).await?;
    create_table(db, &schema, Resource).await?;
    create_table(db, &schema, Stay).await?;
    create_table(db, &schema, Event).await?;
    create_table(db, &schema, EventParticipant).await?;
    create_table(db, &schema, EventNotification).await?;
    create_table(db, &schema, WeeklySubscription).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AccountModel, EntryModel, EventModel, StayModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<AccountModel> = Account::find().limit(1).all(&db).await?;
        let _: Vec<EntryModel> = Entry::find().limit(1).all(&db).await?;
        let _: Vec<StayModel> = Stay::find().limit(1).all(&db).await?;
        let _: Vec<EventModel> = Event::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
