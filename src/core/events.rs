//! Event business logic - Local-time windows, review queues and submission.
//!
//! Event times are stored in UTC. The reminder jobs want the events that
//! touch the deployment's local "today" or "this week", so every window query
//! first turns the local calendar range into UTC bounds (see
//! [`crate::core::localtime`]) and then selects events whose `[start, end]`
//! overlaps it.

use crate::{
    core::localtime::{self, LocalWindow},
    entities::{
        Event, EventNotification, EventParticipant, EventStatus, ParticipantRole, User, Visibility,
        event, event_notification, event_participant, location, user,
    },
    errors::Result,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde::Deserialize;
use tracing::debug;

/// Future events waiting on the event admins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEvents {
    /// Status "waiting for approval"
    pub pending: Vec<event::Model>,
    /// Status "seeking feedback"
    pub feedback: Vec<event::Model>,
}

/// Live events at a location overlapping `window`, ordered by start.
pub async fn live_events_overlapping(
    db: &DatabaseConnection,
    location_id: i64,
    window: LocalWindow,
    public_only: bool,
) -> Result<Vec<event::Model>> {
    let mut query = Event::find()
        .filter(event::Column::LocationId.eq(location_id))
        .filter(event::Column::Status.eq(EventStatus::Live))
        .filter(event::Column::Start.lte(window.end))
        .filter(event::Column::End.gte(window.start));
    if public_only {
        query = query.filter(event::Column::Visibility.eq(Visibility::Public));
    }
    query
        .order_by_asc(event::Column::Start)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Live events of any visibility touching the local day containing `now`.
pub async fn published_events_today_local(
    db: &DatabaseConnection,
    location_id: i64,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<event::Model>> {
    live_events_overlapping(db, location_id, localtime::today_window(now, tz), false).await
}

/// Public live events touching tomorrow through seven days from today, local time.
pub async fn published_events_this_week_local(
    db: &DatabaseConnection,
    location_id: i64,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<Vec<event::Model>> {
    live_events_overlapping(db, location_id, localtime::this_week_window(now, tz), true).await
}

/// Up to `limit` public live events overlapping `window` that start at or after `now`.
pub async fn upcoming_public_events_during(
    db: &DatabaseConnection,
    location_id: i64,
    window: LocalWindow,
    now: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<event::Model>> {
    Event::find()
        .filter(event::Column::LocationId.eq(location_id))
        .filter(event::Column::Status.eq(EventStatus::Live))
        .filter(event::Column::Visibility.eq(Visibility::Public))
        .filter(event::Column::Start.lte(window.end))
        .filter(event::Column::End.gte(window.start))
        .filter(event::Column::Start.gte(now))
        .order_by_asc(event::Column::Start)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn future_with_status(
    db: &DatabaseConnection,
    location_id: i64,
    now: DateTime<Utc>,
    status: EventStatus,
) -> Result<Vec<event::Model>> {
    Event::find()
        .filter(event::Column::LocationId.eq(location_id))
        .filter(event::Column::Start.gt(now))
        .filter(event::Column::Status.eq(status))
        .order_by_asc(event::Column::Start)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Events that have not started yet and still need review.
pub async fn events_pending(
    db: &DatabaseConnection,
    location_id: i64,
    now: DateTime<Utc>,
) -> Result<PendingEvents> {
    Ok(PendingEvents {
        pending: future_with_status(db, location_id, now, EventStatus::WaitingForApproval).await?,
        feedback: future_with_status(db, location_id, now, EventStatus::SeekingFeedback).await?,
    })
}

/// Adds a user to an event as attendee or organizer.
pub async fn add_participant<C>(
    db: &C,
    event_id: i64,
    user_id: i64,
    role: ParticipantRole,
) -> Result<event_participant::Model>
where
    C: ConnectionTrait,
{
    event_participant::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(user_id),
        role: Set(role),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn participant_ids(
    db: &DatabaseConnection,
    event_id: i64,
    role: Option<ParticipantRole>,
) -> Result<Vec<i64>> {
    let mut query = EventParticipant::find()
        .select_only()
        .column(event_participant::Column::UserId)
        .filter(event_participant::Column::EventId.eq(event_id));
    if let Some(role) = role {
        query = query.filter(event_participant::Column::Role.eq(role));
    }
    let mut ids: Vec<i64> = query
        .order_by_asc(event_participant::Column::Id)
        .into_tuple()
        .all(db)
        .await?;
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

async fn users_in_order(db: &DatabaseConnection, ids: Vec<i64>) -> Result<Vec<user::Model>> {
    let mut users = User::find()
        .filter(user::Column::Id.is_in(ids.clone()))
        .all(db)
        .await?;
    users.sort_by_key(|u| ids.iter().position(|id| *id == u.id));
    Ok(users)
}

/// Organizers of an event.
pub async fn organizers(db: &DatabaseConnection, event_id: i64) -> Result<Vec<user::Model>> {
    let ids = participant_ids(db, event_id, Some(ParticipantRole::Organizer)).await?;
    users_in_order(db, ids).await
}

/// Attendees of an event.
pub async fn attendees(db: &DatabaseConnection, event_id: i64) -> Result<Vec<user::Model>> {
    let ids = participant_ids(db, event_id, Some(ParticipantRole::Attendee)).await?;
    users_in_order(db, ids).await
}

/// Attendees and organizers of an event, each user once.
pub async fn participants(db: &DatabaseConnection, event_id: i64) -> Result<Vec<user::Model>> {
    let ids = participant_ids(db, event_id, None).await?;
    users_in_order(db, ids).await
}

/// Whether a user wants "your events today" reminders. No preference means yes.
pub async fn reminders_enabled(db: &DatabaseConnection, user_id: i64) -> Result<bool> {
    Ok(EventNotification::find_by_id(user_id)
        .one(db)
        .await?
        .is_none_or(|pref| pref.reminders))
}

/// Stores a user's reminder preference.
pub async fn set_reminders(db: &DatabaseConnection, user_id: i64, reminders: bool) -> Result<()> {
    EventNotification::insert(event_notification::ActiveModel {
        user_id: Set(user_id),
        reminders: Set(reminders),
    })
    .on_conflict(
        OnConflict::column(event_notification::Column::UserId)
            .update_column(event_notification::Column::Reminders)
            .to_owned(),
    )
    .exec(db)
    .await?;
    Ok(())
}

/// An event as submitted by a member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    /// Required
    pub title: Option<String>,
    /// Derived from the title when absent
    pub slug: Option<String>,
    /// Free text, may be empty
    #[serde(default)]
    pub description: String,
    /// Required
    pub start: Option<DateTime<Utc>>,
    /// Required, and after `start`
    pub end: Option<DateTime<Utc>>,
    /// Defaults to public
    pub visibility: Option<Visibility>,
    /// Comma-separated usernames
    pub co_organizers: Option<String>,
}

/// Lowercase, dash-separated form of a title.
#[must_use]
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Resolves a comma-separated list of usernames to users.
///
/// Blank names are skipped. The first unknown name yields its error message.
pub async fn parse_co_organizers(
    db: &DatabaseConnection,
    raw: &str,
) -> Result<std::result::Result<Vec<user::Model>, String>> {
    let mut found = Vec::new();
    for username in raw.trim_matches(|c| c == ',' || c == ' ').split(',') {
        let username = username.trim();
        if username.is_empty() {
            continue;
        }
        match User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?
        {
            Some(user) => found.push(user),
            None => {
                return Ok(Err(format!(
                    "'{username}' is not a recognized user, please remove them to save your \
                     event. Only users with existing accounts can be listed as co-organizers \
                     (but you can always add them later!)"
                )));
            }
        }
    }
    Ok(Ok(found))
}

/// Submits an event for review.
///
/// The event starts out "waiting for approval". The creator and every
/// co-organizer become organizers. Validation problems come back as
/// messages and nothing is written.
pub async fn create_event(
    db: &DatabaseConnection,
    location: &location::Model,
    creator: &user::Model,
    draft: EventDraft,
) -> Result<std::result::Result<event::Model, Vec<String>>> {
    let mut errors = Vec::new();

    let title = draft.title.as_deref().map(str::trim).unwrap_or_default().to_string();
    if title.is_empty() {
        errors.push("title: This field is required.".to_string());
    }
    let slug = match draft.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slugify(slug),
        _ => slugify(&title),
    };
    if slug.is_empty() && !title.is_empty() {
        errors.push("slug: Enter a valid slug.".to_string());
    }

    match (draft.start, draft.end) {
        (Some(start), Some(end)) if start >= end => {
            errors.push("The event must end after it starts.".to_string());
        }
        (start, end) => {
            if start.is_none() {
                errors.push("start: This field is required.".to_string());
            }
            if end.is_none() {
                errors.push("end: This field is required.".to_string());
            }
        }
    }

    let co_organizers = match parse_co_organizers(db, draft.co_organizers.as_deref().unwrap_or_default()).await? {
        Ok(users) => users,
        Err(message) => {
            errors.push(format!("co_organizers: {message}"));
            Vec::new()
        }
    };

    let (Some(start), Some(end)) = (draft.start, draft.end) else {
        return Ok(Err(errors));
    };
    if !errors.is_empty() {
        return Ok(Err(errors));
    }

    let txn = db.begin().await?;
    let event = event::ActiveModel {
        location_id: Set(location.id),
        creator_id: Set(creator.id),
        title: Set(title),
        slug: Set(slug),
        description: Set(draft.description),
        start: Set(start),
        end: Set(end),
        status: Set(EventStatus::WaitingForApproval),
        visibility: Set(draft.visibility.unwrap_or(Visibility::Public)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut organizer_ids = vec![creator.id];
    for user in &co_organizers {
        if !organizer_ids.contains(&user.id) {
            organizer_ids.push(user.id);
        }
    }
    for user_id in organizer_ids {
        add_participant(&txn, event.id, user_id, ParticipantRole::Organizer).await?;
    }
    txn.commit().await?;

    debug!("Event {} submitted for review at {}", event.id, location.slug);
    Ok(Ok(event))
}
