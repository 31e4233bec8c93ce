//! Stay business logic - Bookings and who is in the house on a given day.
//!
//! A stay covers the nights from `arrive` up to, but not including, `depart`.
//! Occupancy only ever counts confirmed stays.

use crate::{
    entities::{Resource, Stay, StayStatus, User, resource, stay, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::debug;

/// Everything needed to book a stay
#[derive(Debug, Clone)]
pub struct NewStay {
    /// House the stay is at
    pub location_id: i64,
    /// Room booked
    pub resource_id: i64,
    /// The guest
    pub user_id: i64,
    /// First night
    pub arrive: NaiveDate,
    /// Day of departure (not a night of the stay)
    pub depart: NaiveDate,
    /// Initial status
    pub status: StayStatus,
    /// Why the guest is visiting
    pub purpose: String,
    /// Free-form notes for the admins
    pub comments: Option<String>,
}

/// A stay with its guest and room loaded, as the emails need them.
#[derive(Debug, Clone)]
pub struct StayDetail {
    /// The booking
    pub stay: stay::Model,
    /// Who is staying
    pub guest: user::Model,
    /// The room, if it still exists
    pub resource: Option<resource::Model>,
}

/// A booking request as submitted by a member.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    /// Room to book; must belong to the location
    pub resource_id: i64,
    /// First night
    pub arrive: NaiveDate,
    /// Day of departure
    pub depart: NaiveDate,
    /// Why the guest is visiting
    #[serde(default)]
    pub purpose: String,
    /// Free-form notes for the admins
    pub comments: Option<String>,
}

/// Changes a guest makes to an existing booking. Absent fields stay as they are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingChange {
    /// New first night
    pub arrive: Option<NaiveDate>,
    /// New day of departure
    pub depart: Option<NaiveDate>,
    /// New purpose
    pub purpose: Option<String>,
    /// New notes
    pub comments: Option<String>,
}

/// Records a stay.
///
/// # Errors
/// * [`Error::Validation`] if the guest does not leave after arriving
pub async fn create_stay(db: &DatabaseConnection, new: NewStay) -> Result<stay::Model> {
    if new.depart <= new.arrive {
        return Err(Error::Validation {
            message: format!(
                "Departure ({}) must be after arrival ({})",
                new.depart, new.arrive
            ),
        });
    }

    let stay = stay::ActiveModel {
        location_id: Set(new.location_id),
        resource_id: Set(new.resource_id),
        user_id: Set(new.user_id),
        arrive: Set(new.arrive),
        depart: Set(new.depart),
        status: Set(new.status),
        purpose: Set(new.purpose),
        comments: Set(new.comments),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(
        "Created stay {} for user {} ({} - {})",
        stay.id, stay.user_id, stay.arrive, stay.depart
    );
    Ok(stay)
}

/// Books a pending stay at a location for `user_id`.
///
/// # Errors
/// * [`Error::Validation`] if the room is not at this location or the dates are backwards
pub async fn request_booking(
    db: &DatabaseConnection,
    location_id: i64,
    user_id: i64,
    request: BookingRequest,
) -> Result<stay::Model> {
    let room = Resource::find_by_id(request.resource_id).one(db).await?;
    if room.is_none_or(|r| r.location_id != location_id) {
        return Err(Error::Validation {
            message: format!("Room {} is not available at this location", request.resource_id),
        });
    }

    create_stay(
        db,
        NewStay {
            location_id,
            resource_id: request.resource_id,
            user_id,
            arrive: request.arrive,
            depart: request.depart,
            status: StayStatus::Pending,
            purpose: request.purpose.trim().to_string(),
            comments: request.comments.filter(|c| !c.trim().is_empty()),
        },
    )
    .await
}

/// Applies a guest's changes to their booking.
///
/// New dates send an approved or confirmed stay back to pending so the
/// admins look at it again. Canceled stays cannot be changed.
///
/// # Errors
/// * [`Error::Validation`] if the stay is canceled or the new dates are backwards
pub async fn update_booking(
    db: &DatabaseConnection,
    stay: stay::Model,
    change: BookingChange,
) -> Result<stay::Model> {
    if stay.status == StayStatus::Canceled {
        return Err(Error::Validation {
            message: format!("Stay {} was canceled and cannot be changed", stay.id),
        });
    }

    let arrive = change.arrive.unwrap_or(stay.arrive);
    let depart = change.depart.unwrap_or(stay.depart);
    if depart <= arrive {
        return Err(Error::Validation {
            message: format!("Departure ({depart}) must be after arrival ({arrive})"),
        });
    }
    let dates_changed = arrive != stay.arrive || depart != stay.depart;

    let mut active: stay::ActiveModel = stay.into();
    active.arrive = Set(arrive);
    active.depart = Set(depart);
    if dates_changed {
        active.status = Set(StayStatus::Pending);
    }
    if let Some(purpose) = change.purpose {
        active.purpose = Set(purpose.trim().to_string());
    }
    if let Some(comments) = change.comments {
        active.comments = Set(Some(comments).filter(|c| !c.trim().is_empty()));
    }
    let updated = active.update(db).await?;
    debug!("Updated stay {} ({} - {}, {:?})", updated.id, updated.arrive, updated.depart, updated.status);
    Ok(updated)
}

/// Loads the guest and room of a stay.
pub async fn load_detail(db: &DatabaseConnection, stay: stay::Model) -> Result<StayDetail> {
    let guest = User::find_by_id(stay.user_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("Stay {} has no guest", stay.id),
        })?;
    let resource = Resource::find_by_id(stay.resource_id).one(db).await?;
    Ok(StayDetail {
        stay,
        guest,
        resource,
    })
}

/// Confirmed stays at a location whose guest sleeps there on the night of `date`.
pub async fn confirmed_on_date(
    db: &DatabaseConnection,
    location_id: i64,
    date: NaiveDate,
) -> Result<Vec<(stay::Model, user::Model)>> {
    let rows = Stay::find()
        .filter(stay::Column::LocationId.eq(location_id))
        .filter(stay::Column::Status.eq(StayStatus::Confirmed))
        .filter(stay::Column::Arrive.lte(date))
        .filter(stay::Column::Depart.gt(date))
        .find_also_related(User)
        .order_by_asc(stay::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(stay, guest)| guest.map(|g| (stay, g)))
        .collect())
}

/// Other guests' confirmed stays at a location overlapping `[arrive, depart]`.
///
/// One stay per guest, ordered by last then first name.
pub async fn overlapping_confirmed(
    db: &DatabaseConnection,
    location_id: i64,
    arrive: NaiveDate,
    depart: NaiveDate,
    exclude_user_id: i64,
) -> Result<Vec<(stay::Model, user::Model)>> {
    let rows = Stay::find()
        .filter(stay::Column::LocationId.eq(location_id))
        .filter(stay::Column::Status.eq(StayStatus::Confirmed))
        .filter(stay::Column::UserId.ne(exclude_user_id))
        .filter(stay::Column::Arrive.lte(depart))
        .filter(stay::Column::Depart.gte(arrive))
        .find_also_related(User)
        .order_by_asc(user::Column::LastName)
        .order_by_asc(user::Column::FirstName)
        .order_by_asc(stay::Column::Arrive)
        .all(db)
        .await?;

    let mut seen = std::collections::HashSet::new();
    Ok(rows
        .into_iter()
        .filter_map(|(stay, guest)| guest.map(|g| (stay, g)))
        .filter(|(_, guest)| seen.insert(guest.id))
        .collect())
}

/// Stays at a location with `status` that arrive on `date`.
pub async fn arriving_on(
    db: &DatabaseConnection,
    location_id: i64,
    date: NaiveDate,
    status: StayStatus,
) -> Result<Vec<stay::Model>> {
    Stay::find()
        .filter(stay::Column::LocationId.eq(location_id))
        .filter(stay::Column::Status.eq(status))
        .filter(stay::Column::Arrive.eq(date))
        .order_by_asc(stay::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Confirmed stays at a location that end on `date`.
pub async fn departing_on(
    db: &DatabaseConnection,
    location_id: i64,
    date: NaiveDate,
) -> Result<Vec<stay::Model>> {
    Stay::find()
        .filter(stay::Column::LocationId.eq(location_id))
        .filter(stay::Column::Status.eq(StayStatus::Confirmed))
        .filter(stay::Column::Depart.eq(date))
        .order_by_asc(stay::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All stays at a location currently in `status`.
pub async fn with_status(
    db: &DatabaseConnection,
    location_id: i64,
    status: StayStatus,
) -> Result<Vec<stay::Model>> {
    Stay::find()
        .filter(stay::Column::LocationId.eq(location_id))
        .filter(stay::Column::Status.eq(status))
        .order_by_asc(stay::Column::Arrive)
        .all(db)
        .await
        .map_err(Into::into)
}
