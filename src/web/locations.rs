//! Per-location views: event review queue, who is in the house, event and booking submission.

use super::{
    auth::{CurrentUser, denied},
    error::AppResult,
};
use crate::{
    context::AppContext,
    core::{
        access::{self, Access},
        events::{self, EventDraft},
        localtime,
        location as locations,
        stay::{self as stays, BookingChange, BookingRequest},
    },
    entities::{Event, Stay, StayStatus, location, user},
    errors::Error,
    graph::{EventNode, occupants::UserNode},
    mail::messages,
};
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};

#[derive(Debug, Serialize)]
struct PendingView {
    pending: Vec<EventNode>,
    feedback: Vec<EventNode>,
}

#[derive(Debug, Serialize)]
struct TodayView {
    date: NaiveDate,
    in_house: Vec<UserNode>,
    arriving: Vec<UserNode>,
    departing: Vec<UserNode>,
    events: Vec<EventNode>,
}

async fn require_location(db: &DatabaseConnection, slug: &str) -> AppResult<location::Model> {
    locations::get_location(db, slug).await?.ok_or_else(|| {
        Error::LocationNotFound {
            slug: slug.to_string(),
        }
        .into()
    })
}

async fn guests(db: &DatabaseConnection, found: Vec<crate::entities::stay::Model>) -> AppResult<Vec<UserNode>> {
    let mut nodes = Vec::with_capacity(found.len());
    for stay in found {
        let detail = stays::load_detail(db, stay).await?;
        nodes.push(UserNode::from(&detail.guest));
    }
    Ok(nodes)
}

fn signed_in(user: CurrentUser, uri: &Uri, ctx: &AppContext) -> Result<user::Model, Response> {
    user.0.ok_or_else(|| {
        denied(Access::LoginRequired, uri, &ctx.config.server.login_url)
            .unwrap_or_else(|| StatusCode::UNAUTHORIZED.into_response())
    })
}

/// `GET /locations/:slug/events/pending`, house admins only.
pub async fn pending_events(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let access = access::house_admin_required(&ctx.db, user.user(), &slug).await?;
    if let Some(redirect) = denied(access, &uri, &ctx.config.server.login_url) {
        return Ok(redirect);
    }
    let location = require_location(&ctx.db, &slug).await?;

    let review = events::events_pending(&ctx.db, location.id, Utc::now()).await?;
    Ok(Json(PendingView {
        pending: review.pending.into_iter().map(EventNode::from).collect(),
        feedback: review.feedback.into_iter().map(EventNode::from).collect(),
    })
    .into_response())
}

/// `GET /locations/:slug/today`, residents and admins only.
pub async fn today(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(slug): Path<String>,
) -> AppResult<Response> {
    let access = access::resident_or_admin_required(&ctx.db, user.user(), &slug).await?;
    if let Some(redirect) = denied(access, &uri, &ctx.config.server.login_url) {
        return Ok(redirect);
    }
    let location = require_location(&ctx.db, &slug).await?;

    let now = Utc::now();
    let tz = ctx.config.site.time_zone;
    let date = localtime::local_today(now, &tz);

    let in_house = stays::confirmed_on_date(&ctx.db, location.id, date)
        .await?
        .iter()
        .map(|(_, guest)| UserNode::from(guest))
        .collect();
    let arriving = stays::arriving_on(&ctx.db, location.id, date, StayStatus::Confirmed).await?;
    let departing = stays::departing_on(&ctx.db, location.id, date).await?;
    let today = events::published_events_today_local(&ctx.db, location.id, now, &tz).await?;

    Ok(Json(TodayView {
        date,
        in_house,
        arriving: guests(&ctx.db, arriving).await?,
        departing: guests(&ctx.db, departing).await?,
        events: today.into_iter().map(EventNode::from).collect(),
    })
    .into_response())
}

/// `POST /locations/:slug/events`, any signed-in member.
pub async fn create_event(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(slug): Path<String>,
    Json(draft): Json<EventDraft>,
) -> AppResult<Response> {
    let creator = match signed_in(user, &uri, &ctx) {
        Ok(creator) => creator,
        Err(redirect) => return Ok(redirect),
    };
    let location = require_location(&ctx.db, &slug).await?;

    match events::create_event(&ctx.db, &location, &creator, draft).await? {
        Ok(event) => {
            info!("{} submitted event '{}' at {}", creator.username, event.title, location.slug);
            Ok((StatusCode::CREATED, Json(EventNode::from(event))).into_response())
        }
        Err(errors) => Ok((StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()),
    }
}

/// `GET /locations/:slug/events/:id/email`, organizers and house admins only.
pub async fn event_email(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path((slug, event_id)): Path<(String, i64)>,
) -> AppResult<Response> {
    let viewer = match signed_in(user, &uri, &ctx) {
        Ok(viewer) => viewer,
        Err(redirect) => return Ok(redirect),
    };
    let location = require_location(&ctx.db, &slug).await?;
    let Some(event) = Event::find_by_id(event_id)
        .one(&ctx.db)
        .await?
        .filter(|e| e.location_id == location.id)
    else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let organizer = events::organizers(&ctx.db, event.id).await?.iter().any(|o| o.id == viewer.id);
    let access = if organizer {
        Access::Granted
    } else {
        access::house_admin_required(&ctx.db, Some(&viewer), &slug).await?
    };
    if let Some(redirect) = denied(access, &uri, &ctx.config.server.login_url) {
        return Ok(redirect);
    }

    let draft = messages::event_email_draft(&ctx, &event, &location).await?;
    Ok(Json(draft).into_response())
}

/// `POST /locations/:slug/stays`, any signed-in member books for themselves.
pub async fn request_stay(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(slug): Path<String>,
    Json(request): Json<BookingRequest>,
) -> AppResult<Response> {
    let guest = match signed_in(user, &uri, &ctx) {
        Ok(guest) => guest,
        Err(redirect) => return Ok(redirect),
    };
    let location = require_location(&ctx.db, &slug).await?;

    let stay = stays::request_booking(&ctx.db, location.id, guest.id, request).await?;
    info!("{} requested stay {} at {}", guest.username, stay.id, location.slug);

    let detail = stays::load_detail(&ctx.db, stay).await?;
    if let Err(e) = messages::new_booking_notify(&ctx, &detail, &location).await {
        error!("Booking {} saved but admins were not notified: {}", detail.stay.id, e);
    }
    Ok((StatusCode::CREATED, Json(detail.stay)).into_response())
}

/// `PATCH /locations/:slug/stays/:id`, only the guest may change their booking.
pub async fn change_stay(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path((slug, stay_id)): Path<(String, i64)>,
    Json(change): Json<BookingChange>,
) -> AppResult<Response> {
    let guest = match signed_in(user, &uri, &ctx) {
        Ok(guest) => guest,
        Err(redirect) => return Ok(redirect),
    };
    let location = require_location(&ctx.db, &slug).await?;
    let Some(stay) = Stay::find_by_id(stay_id)
        .one(&ctx.db)
        .await?
        .filter(|s| s.location_id == location.id)
    else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    if stay.user_id != guest.id {
        return Ok(denied(Access::Forbidden, &uri, &ctx.config.server.login_url)
            .unwrap_or_else(|| StatusCode::FORBIDDEN.into_response()));
    }

    let stay = stays::update_booking(&ctx.db, stay, change).await?;
    let detail = stays::load_detail(&ctx.db, stay).await?;
    if let Err(e) = messages::updated_booking_notify(&ctx, &detail, &location).await {
        error!("Booking {} changed but admins were not notified: {}", detail.stay.id, e);
    }
    Ok(Json(detail.stay).into_response())
}
