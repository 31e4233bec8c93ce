//! Location business logic - Lookup, role sets and mail addresses.

use crate::{
    entities::{
        Location, LocationRole, LocationRoleKind, User, WeeklySubscription, location,
        location_role, user, weekly_subscription,
    },
    errors::Result,
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Finds a location by slug.
pub async fn get_location<C>(db: &C, slug: &str) -> Result<Option<location::Model>>
where
    C: ConnectionTrait,
{
    Location::find()
        .filter(location::Column::Slug.eq(slug))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Every location, ordered by slug.
pub async fn all_locations(db: &DatabaseConnection) -> Result<Vec<location::Model>> {
    Location::find()
        .order_by_asc(location::Column::Slug)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Gives a user a role at a location.
pub async fn add_role(
    db: &DatabaseConnection,
    location_id: i64,
    user_id: i64,
    role: LocationRoleKind,
) -> Result<location_role::Model> {
    location_role::ActiveModel {
        location_id: Set(location_id),
        user_id: Set(user_id),
        role: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn users_by_ids(db: &DatabaseConnection, user_ids: Vec<i64>) -> Result<Vec<user::Model>> {
    User::find()
        .filter(user::Column::Id.is_in(user_ids))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Users holding `role` at the location, ordered by id.
pub async fn users_with_role(
    db: &DatabaseConnection,
    location_id: i64,
    role: LocationRoleKind,
) -> Result<Vec<user::Model>> {
    let user_ids = LocationRole::find()
        .filter(location_role::Column::LocationId.eq(location_id))
        .filter(location_role::Column::Role.eq(role))
        .all(db)
        .await?
        .into_iter()
        .map(|r| r.user_id)
        .collect();
    users_by_ids(db, user_ids).await
}

/// House admins of a location.
pub async fn house_admins(db: &DatabaseConnection, location_id: i64) -> Result<Vec<user::Model>> {
    users_with_role(db, location_id, LocationRoleKind::HouseAdmin).await
}

/// Read-only admins of a location.
pub async fn readonly_admins(db: &DatabaseConnection, location_id: i64) -> Result<Vec<user::Model>> {
    users_with_role(db, location_id, LocationRoleKind::ReadonlyAdmin).await
}

/// Residents of a location.
pub async fn residents(db: &DatabaseConnection, location_id: i64) -> Result<Vec<user::Model>> {
    users_with_role(db, location_id, LocationRoleKind::Resident).await
}

/// Event admins of a location.
pub async fn event_admins(db: &DatabaseConnection, location_id: i64) -> Result<Vec<user::Model>> {
    users_with_role(db, location_id, LocationRoleKind::EventAdmin).await
}

/// Subscribes a user to the weekly events digest of a location.
pub async fn subscribe_weekly(
    db: &DatabaseConnection,
    location_id: i64,
    user_id: i64,
) -> Result<weekly_subscription::Model> {
    weekly_subscription::ActiveModel {
        location_id: Set(location_id),
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Users subscribed to the weekly digest of a location.
pub async fn weekly_subscribers(db: &DatabaseConnection, location_id: i64) -> Result<Vec<user::Model>> {
    let user_ids = WeeklySubscription::find()
        .filter(weekly_subscription::Column::LocationId.eq(location_id))
        .all(db)
        .await?
        .into_iter()
        .map(|s| s.user_id)
        .collect();
    users_by_ids(db, user_ids).await
}

/// Address of a per-location list, e.g. `residents@redvic.lists.example.org`.
#[must_use]
pub fn list_address(location: &location::Model, list: &str, list_domain: &str) -> String {
    format!("{list}@{}.{list_domain}", location.slug)
}

/// The address the location sends from; also the admin (`stay@`) list.
#[must_use]
pub fn from_email(location: &location::Model, list_domain: &str) -> String {
    list_address(location, "stay", list_domain)
}

/// Subject prefix in brackets, e.g. `[RedVic] `.
#[must_use]
pub fn subject_prefix(location: &location::Model) -> String {
    format!("[{}] ", location.email_subject_prefix)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_role_sets_are_separate() -> Result<()> {
        let db = setup_test_db().await?;
        let house = create_test_location(&db, "redvic").await?;
        let other = create_test_location(&db, "embassy").await?;
        let admin = create_test_user(&db, "admin").await?;
        let resident = create_test_user(&db, "resident").await?;
        add_role(&db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;
        add_role(&db, house.id, resident.id, LocationRoleKind::Resident).await?;
        add_role(&db, other.id, resident.id, LocationRoleKind::HouseAdmin).await?;

        let admins = house_admins(&db, house.id).await?;
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "admin");

        let residents = residents(&db, house.id).await?;
        assert_eq!(residents.len(), 1);
        assert_eq!(residents[0].username, "resident");

        assert!(readonly_admins(&db, house.id).await?.is_empty());
        assert_eq!(house_admins(&db, other.id).await?[0].username, "resident");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_location_by_slug() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_location(&db, "redvic").await?;
        assert_eq!(get_location(&db, "redvic").await?.unwrap().slug, "redvic");
        assert!(get_location(&db, "nowhere").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_addresses() -> Result<()> {
        let db = setup_test_db().await?;
        let house = create_test_location(&db, "redvic").await?;
        assert_eq!(from_email(&house, "lists.example.org"), "stay@redvic.lists.example.org");
        assert_eq!(
            list_address(&house, "current", "lists.example.org"),
            "current@redvic.lists.example.org"
        );
        assert_eq!(subject_prefix(&house), "[REDVIC] ");
        Ok(())
    }
}
