//! Access checks for views.
//!
//! Each check decides between letting the request through, sending a signed-in
//! user home, or sending an anonymous visitor to the login page.

use crate::{
    core::location,
    entities::{UserGroup, user, user_group},
    errors::Result,
};
use sea_orm::{DatabaseConnection, prelude::*};

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Proceed with the view
    Granted,
    /// Signed in but not allowed: redirect to `/`
    Forbidden,
    /// Not signed in: redirect to the login page
    LoginRequired,
}

impl Access {
    /// Where to redirect a denied request for `path_and_query`, if anywhere.
    ///
    /// The login redirect carries the original target percent-encoded in `next`.
    #[must_use]
    pub fn redirect_target(self, path_and_query: &str, login_url: &str) -> Option<String> {
        match self {
            Self::Granted => None,
            Self::Forbidden => Some("/".to_string()),
            Self::LoginRequired => Some(format!("{login_url}?next={}", urlencoding::encode(path_and_query))),
        }
    }
}

/// Requires membership in at least one of `group_names` (superusers always pass).
pub async fn group_required(
    db: &DatabaseConnection,
    user: Option<&user::Model>,
    group_names: &[&str],
) -> Result<Access> {
    let Some(user) = user else {
        return Ok(Access::LoginRequired);
    };
    if user.is_superuser {
        return Ok(Access::Granted);
    }

    let membership = UserGroup::find()
        .filter(user_group::Column::UserId.eq(user.id))
        .filter(user_group::Column::Name.is_in(group_names.iter().copied()))
        .one(db)
        .await?;

    Ok(if membership.is_some() {
        Access::Granted
    } else {
        Access::Forbidden
    })
}

/// Requires the user to be a house admin of the location named by `location_slug`.
pub async fn house_admin_required(
    db: &DatabaseConnection,
    user: Option<&user::Model>,
    location_slug: &str,
) -> Result<Access> {
    let Some(user) = user else {
        return Ok(Access::LoginRequired);
    };
    let Some(location) = location::get_location(db, location_slug).await? else {
        return Ok(Access::Forbidden);
    };

    let admins = location::house_admins(db, location.id).await?;
    Ok(if admins.iter().any(|a| a.id == user.id) {
        Access::Granted
    } else {
        Access::Forbidden
    })
}

/// Requires the user to be a resident, house admin or read-only admin of the location.
pub async fn resident_or_admin_required(
    db: &DatabaseConnection,
    user: Option<&user::Model>,
    location_slug: &str,
) -> Result<Access> {
    let Some(user) = user else {
        return Ok(Access::LoginRequired);
    };
    let Some(location) = location::get_location(db, location_slug).await? else {
        return Ok(Access::Forbidden);
    };

    let allowed = location::residents(db, location.id).await?.iter().any(|u| u.id == user.id)
        || location::house_admins(db, location.id).await?.iter().any(|u| u.id == user.id)
        || location::readonly_admins(db, location.id).await?.iter().any(|u| u.id == user.id);

    Ok(if allowed {
        Access::Granted
    } else {
        Access::Forbidden
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::LocationRoleKind;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_group_required() -> Result<()> {
        let db = setup_test_db().await?;
        let member = create_test_user(&db, "member").await?;
        let outsider = create_test_user(&db, "outsider").await?;
        let root = create_superuser(&db, "root").await?;
        add_to_group(&db, member.id, "scheduler").await?;

        assert_eq!(group_required(&db, Some(&member), &["scheduler", "ops"]).await?, Access::Granted);
        assert_eq!(group_required(&db, Some(&outsider), &["scheduler"]).await?, Access::Forbidden);
        assert_eq!(group_required(&db, Some(&root), &["scheduler"]).await?, Access::Granted);
        assert_eq!(group_required(&db, None, &["scheduler"]).await?, Access::LoginRequired);
        Ok(())
    }

    #[tokio::test]
    async fn test_house_admin_required() -> Result<()> {
        let db = setup_test_db().await?;
        let house = create_test_location(&db, "redvic").await?;
        let admin = create_test_user(&db, "admin").await?;
        let resident = create_test_user(&db, "resident").await?;
        add_location_role(&db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;
        add_location_role(&db, house.id, resident.id, LocationRoleKind::Resident).await?;

        assert_eq!(house_admin_required(&db, Some(&admin), "redvic").await?, Access::Granted);
        assert_eq!(house_admin_required(&db, Some(&resident), "redvic").await?, Access::Forbidden);
        assert_eq!(house_admin_required(&db, Some(&admin), "nowhere").await?, Access::Forbidden);
        assert_eq!(house_admin_required(&db, None, "redvic").await?, Access::LoginRequired);
        Ok(())
    }

    #[tokio::test]
    async fn test_resident_or_admin_required() -> Result<()> {
        let db = setup_test_db().await?;
        let house = create_test_location(&db, "redvic").await?;
        let resident = create_test_user(&db, "resident").await?;
        let viewer = create_test_user(&db, "viewer").await?;
        let guest = create_test_user(&db, "guest").await?;
        add_location_role(&db, house.id, resident.id, LocationRoleKind::Resident).await?;
        add_location_role(&db, house.id, viewer.id, LocationRoleKind::ReadonlyAdmin).await?;

        assert_eq!(resident_or_admin_required(&db, Some(&resident), "redvic").await?, Access::Granted);
        assert_eq!(resident_or_admin_required(&db, Some(&viewer), "redvic").await?, Access::Granted);
        assert_eq!(resident_or_admin_required(&db, Some(&guest), "redvic").await?, Access::Forbidden);
        Ok(())
    }

    #[test]
    fn test_redirect_targets() {
        assert_eq!(Access::Granted.redirect_target("/x", "/login/"), None);
        assert_eq!(Access::Forbidden.redirect_target("/x", "/login/"), Some("/".to_string()));
        assert_eq!(
            Access::LoginRequired.redirect_target("/locations/redvic/today", "/login/"),
            Some("/login/?next=%2Flocations%2Fredvic%2Ftoday".to_string())
        );
        assert_eq!(
            Access::LoginRequired.redirect_target("/accounts?from=1&to=2", "/login/"),
            Some("/login/?next=%2Faccounts%3Ffrom%3D1%26to%3D2".to_string())
        );
    }
}
