//! Occupancy resolvers: a member's own stays and who and what overlaps them.

use crate::{
    core::{
        events,
        localtime::{self, days_window},
        stay as stays,
    },
    entities::{Stay, StayStatus, User, event, stay, user},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{QueryOrder, prelude::*};
use serde::{Deserialize, Serialize};

/// Upcoming events listed per stay.
const UPCOMING_EVENTS_LIMIT: u64 = 3;

/// Optional filters for [`my_occupancies`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupancyFilter {
    /// Only stays arriving on this date
    pub arrive: Option<NaiveDate>,
    /// Only stays at this location id
    pub location: Option<i64>,
}

/// The guest of a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNode {
    /// User id
    pub id: i64,
    /// Login name
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

impl From<&user::Model> for UserNode {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// An event overlapping a stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventNode {
    /// Event id
    pub id: i64,
    /// Display title
    pub title: String,
    /// URL-safe form of the title
    pub slug: String,
    /// Start instant (UTC)
    pub start: DateTime<Utc>,
    /// End instant (UTC)
    pub end: DateTime<Utc>,
}

impl From<event::Model> for EventNode {
    fn from(event: event::Model) -> Self {
        Self {
            id: event.id,
            title: event.title,
            slug: event.slug,
            start: event.start,
            end: event.end,
        }
    }
}

/// A stay as seen through the occupancy API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupantNode {
    /// Stay id
    pub id: i64,
    /// Where the stay is
    pub location_id: i64,
    /// First night
    pub arrive: NaiveDate,
    /// Day of departure
    pub depart: NaiveDate,
    /// Booking status
    pub status: StayStatus,
    /// The guest
    pub user: UserNode,
    /// Occupant type, see [`resolve_type`]
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Only resolved on top-level nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupants_during: Option<Vec<OccupantNode>>,
    /// Public events overlapping the stay; only resolved on top-level nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_events_during: Option<Vec<EventNode>>,
}

impl OccupantNode {
    fn leaf(stay: &stay::Model, user: &user::Model) -> Self {
        Self {
            id: stay.id,
            location_id: stay.location_id,
            arrive: stay.arrive,
            depart: stay.depart,
            status: stay.status,
            user: UserNode::from(user),
            kind: resolve_type(stay),
            occupants_during: None,
            upcoming_events_during: None,
        }
    }
}

/// Every occupant is reported as a guest.
#[must_use]
pub const fn resolve_type(_stay: &stay::Model) -> &'static str {
    "guest"
}

/// The querying user's stays; nothing for anonymous callers.
pub async fn my_occupancies(
    db: &DatabaseConnection,
    viewer: Option<&user::Model>,
    filter: &OccupancyFilter,
) -> Result<Vec<stay::Model>> {
    let Some(viewer) = viewer else {
        return Ok(Vec::new());
    };
    let mut query = Stay::find().filter(stay::Column::UserId.eq(viewer.id));
    if let Some(arrive) = filter.arrive {
        query = query.filter(stay::Column::Arrive.eq(arrive));
    }
    if let Some(location_id) = filter.location {
        query = query.filter(stay::Column::LocationId.eq(location_id));
    }
    query
        .order_by_asc(stay::Column::Arrive)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The querying user's stays that have not ended before `today`.
pub async fn my_current_occupancies(
    db: &DatabaseConnection,
    viewer: Option<&user::Model>,
    today: NaiveDate,
) -> Result<Vec<stay::Model>> {
    let Some(viewer) = viewer else {
        return Ok(Vec::new());
    };
    Stay::find()
        .filter(stay::Column::UserId.eq(viewer.id))
        .filter(stay::Column::Depart.gte(today))
        .order_by_asc(stay::Column::Arrive)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Other guests confirmed at the same place during a stay.
pub async fn occupants_during(
    db: &DatabaseConnection,
    stay: &stay::Model,
) -> Result<Vec<OccupantNode>> {
    let others = stays::overlapping_confirmed(db, stay.location_id, stay.arrive, stay.depart, stay.user_id).await?;
    Ok(others
        .iter()
        .map(|(other, guest)| OccupantNode::leaf(other, guest))
        .collect())
}

/// The next few public events at the location during a stay.
pub async fn upcoming_events_during(
    db: &DatabaseConnection,
    stay: &stay::Model,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<EventNode>> {
    let window = days_window(stay.arrive, stay.depart, tz);
    let found = events::upcoming_public_events_during(db, stay.location_id, window, now, UPCOMING_EVENTS_LIMIT).await?;
    Ok(found.into_iter().map(EventNode::from).collect())
}

/// Resolves full nodes (with overlapping occupants and events) for stays.
pub async fn resolve_nodes(
    db: &DatabaseConnection,
    found: Vec<stay::Model>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<OccupantNode>> {
    let mut nodes = Vec::with_capacity(found.len());
    for stay in found {
        let Some(guest) = User::find_by_id(stay.user_id).one(db).await? else {
            continue;
        };
        let mut node = OccupantNode::leaf(&stay, &guest);
        node.occupants_during = Some(occupants_during(db, &stay).await?);
        node.upcoming_events_during = Some(upcoming_events_during(db, &stay, now, tz).await?);
        nodes.push(node);
    }
    Ok(nodes)
}

/// Local date used for "current" occupancies.
#[must_use]
pub fn occupancy_today(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    localtime::local_today(now, tz)
}
