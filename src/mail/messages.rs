//! Outbound emails sent on behalf of a location.
//!
//! Every composer returns `Ok(None)` when it decided there was nothing to
//! send (no recipients, nothing happening, or an override with no bodies).

use super::{
    MailReceipt, OutboundMessage, dedupe_addresses,
    templates::{EmailKey, RenderedEmail, TemplateContext, render_templates},
};
use crate::{
    context::AppContext,
    core::{
        events,
        localtime::{self, weekday_name},
        location as locations,
        stay::{self, StayDetail},
    },
    entities::{StayStatus, User, event, location, stay as stay_entity, user},
    errors::Result,
};
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use sea_orm::prelude::*;
use serde::Serialize;
use tracing::debug;

/// One line per event: title and local start/end.
fn event_lines(events: &[event::Model], tz: &Tz) -> String {
    if events.is_empty() {
        return "(none)".to_string();
    }
    events
        .iter()
        .map(|e| {
            format!(
                "- {}, {} - {}",
                e.title,
                e.start.with_timezone(tz).format("%a %b %-d, %-I:%M %p"),
                e.end.with_timezone(tz).format("%a %b %-d, %-I:%M %p"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn person_lines(people: &[user::Model]) -> String {
    if people.is_empty() {
        return "(none)".to_string();
    }
    people
        .iter()
        .map(|u| format!("- {} {}", u.first_name, u.last_name))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn stay_lines(db: &DatabaseConnection, stays: &[stay_entity::Model]) -> Result<String> {
    if stays.is_empty() {
        return Ok("(none)".to_string());
    }
    let guests = User::find()
        .filter(user::Column::Id.is_in(stays.iter().map(|s| s.user_id)))
        .all(db)
        .await?;
    Ok(stays
        .iter()
        .map(|s| {
            let name = guests
                .iter()
                .find(|g| g.id == s.user_id)
                .map_or_else(|| "unknown guest".to_string(), |g| format!("{} {}", g.first_name, g.last_name));
            format!("- {name} ({} - {})", s.arrive, s.depart)
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

fn profile_url(ctx: &AppContext, user: &user::Model) -> String {
    ctx.site_url(&format!("/people/{}/", user.username))
}

fn booking_url(ctx: &AppContext, location: &location::Model, stay_id: i64) -> String {
    ctx.site_url(&format!("/locations/{}/stays/{stay_id}/", location.slug))
}

/// Sends rendered bodies from the location's `stay@` address.
pub async fn send_from_location_address(
    ctx: &AppContext,
    location: &location::Model,
    subject: String,
    rendered: RenderedEmail,
    to: Vec<String>,
) -> Result<Option<MailReceipt>> {
    if rendered.is_empty() {
        debug!("Nothing rendered for \"{}\", not sending", subject);
        return Ok(None);
    }
    if to.is_empty() {
        debug!("No recipients for \"{}\", not sending", subject);
        return Ok(None);
    }

    let message = OutboundMessage {
        from: locations::from_email(location, ctx.list_domain()),
        to,
        subject,
        text: rendered.text,
        html: rendered.html,
        ..Default::default()
    };
    ctx.mailer.send(&message).await.map(Some)
}

/// "Your events today" reminder for one person.
pub async fn send_events_list(
    ctx: &AppContext,
    user: &user::Model,
    events: &[event::Model],
    location: &location::Model,
    now: DateTime<Utc>,
) -> Result<Option<MailReceipt>> {
    let tz = ctx.config.site.time_zone;
    let today = localtime::local_today(now, &tz);
    let footer = format!(
        "You are receiving this email because your preferences for event reminders are on. \
         To turn them off, visit {}",
        profile_url(ctx, user)
    );
    let context = TemplateContext::new()
        .with("first_name", &user.first_name)
        .with("location_name", &location.name)
        .with("domain", &ctx.config.site.domain)
        .with("day_of_week", weekday_name(today))
        .with("events", event_lines(events, &tz))
        .with("footer", footer);

    let rendered = render_templates(&ctx.db, location.id, EmailKey::EventsToday, &context).await?;
    let subject = format!("{}Reminder of your events today", locations::subject_prefix(location));
    send_from_location_address(ctx, location, subject, rendered, vec![user.email.clone()]).await
}

/// Weekly digest of upcoming public events for one subscriber.
pub async fn weekly_reminder_email(
    ctx: &AppContext,
    user: &user::Model,
    events: &[event::Model],
    location: &location::Model,
    now: DateTime<Utc>,
) -> Result<Option<MailReceipt>> {
    let tz = ctx.config.site.time_zone;
    let tomorrow = localtime::local_today(now, &tz) + TimeDelta::days(1);
    let week_name = tomorrow.format("%B %d, %Y").to_string();
    let footer = format!(
        "You are receiving this email because you requested weekly updates of upcoming events \
         from {}. To turn them off, visit {}",
        location.name,
        profile_url(ctx, user)
    );
    let context = TemplateContext::new()
        .with("first_name", &user.first_name)
        .with("location_name", &location.name)
        .with("domain", &ctx.config.site.domain)
        .with("week_name", &week_name)
        .with("events", event_lines(events, &tz))
        .with("footer", footer);

    let rendered = render_templates(&ctx.db, location.id, EmailKey::EventsThisWeek, &context).await?;
    let subject = format!(
        "{}Upcoming events for the week of {week_name}",
        locations::subject_prefix(location)
    );
    send_from_location_address(ctx, location, subject, rendered, vec![user.email.clone()]).await
}

async fn house_admin_emails(ctx: &AppContext, location: &location::Model) -> Result<Vec<String>> {
    let admins = locations::house_admins(&ctx.db, location.id).await?;
    Ok(dedupe_addresses(admins.into_iter().map(|a| a.email)))
}

/// Tells the house admins about a new booking request.
pub async fn new_booking_notify(
    ctx: &AppContext,
    detail: &StayDetail,
    location: &location::Model,
) -> Result<Option<MailReceipt>> {
    let StayDetail { stay, guest, resource } = detail;
    let context = TemplateContext::new()
        .with("location_name", &location.name)
        .with("status", format!("{:?}", stay.status).to_lowercase())
        .with("first_name", &guest.first_name)
        .with("last_name", &guest.last_name)
        .with("room_name", resource.as_ref().map(|r| r.name.clone()).unwrap_or_default())
        .with("arrive", stay.arrive.to_string())
        .with("depart", stay.depart.to_string())
        .with("purpose", &stay.purpose)
        .with("comments", stay.comments.clone().unwrap_or_default())
        .with(
            "admin_url",
            ctx.site_url(&format!("/locations/{}/stays/{}/manage/", location.slug, stay.id)),
        );

    let rendered = render_templates(&ctx.db, location.id, EmailKey::NewBooking, &context).await?;
    let subject = format!(
        "{}Booking Request, {} {}, {} - {}",
        locations::subject_prefix(location),
        guest.first_name,
        guest.last_name,
        stay.arrive,
        stay.depart
    );
    let recipients = house_admin_emails(ctx, location).await?;
    send_from_location_address(ctx, location, subject, rendered, recipients).await
}

/// Tells the house admins a booking changed and needs another look.
pub async fn updated_booking_notify(
    ctx: &AppContext,
    detail: &StayDetail,
    location: &location::Model,
) -> Result<Option<MailReceipt>> {
    let StayDetail { stay, guest, .. } = detail;
    let admin_url = ctx.site_url(&format!("/locations/{}/stays/{}/manage/", location.slug, stay.id));
    let text = format!(
        "Howdy,\n\nA booking has been updated and requires your review.\n\nManage this booking at {admin_url}."
    );
    let subject = format!(
        "{}Booking Updated, {} {}, {} - {}",
        locations::subject_prefix(location),
        guest.first_name,
        guest.last_name,
        stay.arrive,
        stay.depart
    );
    let recipients = house_admin_emails(ctx, location).await?;
    let rendered = RenderedEmail {
        text: Some(text),
        html: None,
    };
    send_from_location_address(ctx, location, subject, rendered, recipients).await
}

/// Welcome email sent to a guest shortly before arrival.
pub async fn guest_welcome(
    ctx: &AppContext,
    detail: &StayDetail,
    location: &location::Model,
) -> Result<Option<MailReceipt>> {
    let StayDetail { stay, guest, .. } = detail;
    let tz = ctx.config.site.time_zone;
    let day_of_week = weekday_name(stay.arrive);

    let others = stay::overlapping_confirmed(&ctx.db, location.id, stay.arrive, stay.depart, guest.id).await?;
    let other_stays: Vec<stay_entity::Model> = others.into_iter().map(|(s, _)| s).collect();
    let window = localtime::days_window(stay.arrive, stay.depart, &tz);
    let during = events::live_events_overlapping(&ctx.db, location.id, window, false).await?;
    let residents = locations::residents(&ctx.db, location.id).await?;

    let context = TemplateContext::new()
        .with("first_name", &guest.first_name)
        .with("day_of_week", day_of_week)
        .with("location_name", &location.name)
        .with("current_email", locations::list_address(location, "current", ctx.list_domain()))
        .with("site_url", ctx.site_url(&format!("/locations/{}/", location.slug)))
        .with("events_url", ctx.site_url(&format!("/locations/{}/events/", location.slug)))
        .with("profile_url", profile_url(ctx, guest))
        .with("booking_url", booking_url(ctx, location, stay.id))
        .with("intersecting_stays", stay_lines(&ctx.db, &other_stays).await?)
        .with("intersecting_events", event_lines(&during, &tz))
        .with("residents", person_lines(&residents));

    let rendered = render_templates(&ctx.db, location.id, EmailKey::Welcome, &context).await?;
    let subject = format!("{}See you on {day_of_week}", locations::subject_prefix(location));
    send_from_location_address(ctx, location, subject, rendered, vec![guest.email.clone()]).await
}

/// Thank-you email sent to a guest on departure.
pub async fn goodbye_email(
    ctx: &AppContext,
    detail: &StayDetail,
    location: &location::Model,
) -> Result<Option<MailReceipt>> {
    let StayDetail { stay, guest, .. } = detail;
    let context = TemplateContext::new()
        .with("first_name", &guest.first_name)
        .with("location_name", &location.name)
        .with("booking_url", booking_url(ctx, location, stay.id))
        .with("new_booking_url", ctx.site_url(&format!("/locations/{}/stay/", location.slug)));

    let rendered = render_templates(&ctx.db, location.id, EmailKey::Departure, &context).await?;
    let subject = format!("{}Thank you for staying with us", locations::subject_prefix(location));
    send_from_location_address(ctx, location, subject, rendered, vec![guest.email.clone()]).await
}

/// Morning digest for the house admins.
///
/// Skipped when nothing is arriving, departing, happening or waiting for a
/// decision, or when the location has no admins.
pub async fn admin_daily_update(
    ctx: &AppContext,
    location: &location::Model,
    now: DateTime<Utc>,
) -> Result<Option<MailReceipt>> {
    let db = &ctx.db;
    let tz = ctx.config.site.time_zone;
    let today = localtime::local_today(now, &tz);

    let arriving = stay::arriving_on(db, location.id, today, StayStatus::Confirmed).await?;
    let maybe_arriving = stay::arriving_on(db, location.id, today, StayStatus::Approved).await?;
    let pending_now = stay::with_status(db, location.id, StayStatus::Pending).await?;
    let approved_now = stay::with_status(db, location.id, StayStatus::Approved).await?;
    let departing = stay::departing_on(db, location.id, today).await?;
    let events_today = events::published_events_today_local(db, location.id, now, &tz).await?;
    let review = events::events_pending(db, location.id, now).await?;

    if arriving.is_empty()
        && departing.is_empty()
        && events_today.is_empty()
        && maybe_arriving.is_empty()
        && pending_now.is_empty()
        && approved_now.is_empty()
    {
        debug!("Nothing happening today at {}, skipping daily email", location.name);
        return Ok(None);
    }

    let recipients = house_admin_emails(ctx, location).await?;
    if recipients.is_empty() {
        debug!("{}: No admins to send to", location.slug);
        return Ok(None);
    }

    let context = TemplateContext::new()
        .with("today", today.to_string())
        .with("domain", &ctx.config.site.domain)
        .with("location_name", &location.name)
        .with("arriving", stay_lines(db, &arriving).await?)
        .with("maybe_arriving", stay_lines(db, &maybe_arriving).await?)
        .with("pending_now", stay_lines(db, &pending_now).await?)
        .with("approved_now", stay_lines(db, &approved_now).await?)
        .with("departing", stay_lines(db, &departing).await?)
        .with("events_today", event_lines(&events_today, &tz))
        .with("events_pending", event_lines(&review.pending, &tz))
        .with("events_feedback", event_lines(&review.feedback, &tz));

    let rendered = render_templates(db, location.id, EmailKey::AdminDailyUpdate, &context).await?;
    let subject = format!("{}{today} Events and Guests", locations::subject_prefix(location));
    send_from_location_address(ctx, location, subject, rendered, recipients).await
}

/// Morning digest for current guests and residents who are not admins.
pub async fn guests_residents_daily_update(
    ctx: &AppContext,
    location: &location::Model,
    now: DateTime<Utc>,
) -> Result<Option<MailReceipt>> {
    let db = &ctx.db;
    let tz = ctx.config.site.time_zone;
    let today = localtime::local_today(now, &tz);

    let arriving = stay::arriving_on(db, location.id, today, StayStatus::Confirmed).await?;
    let departing = stay::departing_on(db, location.id, today).await?;
    let events_today = events::published_events_today_local(db, location.id, now, &tz).await?;

    if arriving.is_empty() && departing.is_empty() && events_today.is_empty() {
        debug!("Nothing happening today at {}, skipping daily email", location.name);
        return Ok(None);
    }

    let admin_emails = house_admin_emails(ctx, location).await?;
    let current = stay::confirmed_on_date(db, location.id, today).await?;
    let residents = locations::residents(db, location.id).await?;
    let recipients: Vec<String> = dedupe_addresses(
        current
            .into_iter()
            .map(|(_, guest)| guest.email)
            .chain(residents.into_iter().map(|r| r.email))
            .filter(|email| !admin_emails.contains(email)),
    );
    if recipients.is_empty() {
        debug!("No non-admins to send daily update to");
        return Ok(None);
    }

    let context = TemplateContext::new()
        .with("today", today.to_string())
        .with("domain", &ctx.config.site.domain)
        .with("location_name", &location.name)
        .with("arriving", stay_lines(db, &arriving).await?)
        .with("departing", stay_lines(db, &departing).await?)
        .with("events_today", event_lines(&events_today, &tz));

    let rendered = render_templates(db, location.id, EmailKey::GuestDailyUpdate, &context).await?;
    let subject = format!(
        "{}Events, Arrivals and Departures for {today}",
        locations::subject_prefix(location)
    );
    send_from_location_address(ctx, location, subject, rendered, recipients).await
}

/// What an organizer needs to write to everyone taking part in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEmailDraft {
    /// The location's own address
    pub from: String,
    /// Attendees and organizers, deduplicated
    pub recipients: Vec<String>,
    /// Prefixed event title
    pub subject: String,
    /// Why recipients get the message, with a link to the event
    pub footer: String,
}

/// Prepares an organizer's message to the attendees and organizers of an event.
pub async fn event_email_draft(
    ctx: &AppContext,
    event: &event::Model,
    location: &location::Model,
) -> Result<EventEmailDraft> {
    let people = events::participants(&ctx.db, event.id).await?;
    let event_url = ctx.site_url(&format!(
        "/locations/{}/events/{}/{}/",
        location.slug, event.id, event.slug
    ));
    Ok(EventEmailDraft {
        from: locations::from_email(location, ctx.list_domain()),
        recipients: dedupe_addresses(people.into_iter().map(|u| u.email)),
        subject: format!("{}{}", locations::subject_prefix(location), event.title),
        footer: format!(
            "You are receiving this email because you are attending or organizing {} at {}. \
             Event details: {event_url}",
            event.title, location.name
        ),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        entities::{EventStatus, LocationRoleKind, ParticipantRole, Visibility},
        test_utils::*,
    };
    use chrono::TimeZone;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_send_events_list_subject_and_body() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let user = create_test_user(&ctx.db, "ada").await?;
        let event = create_test_event(&ctx.db, house.id, user.id, "Potluck", noon(2019, 3, 14), noon(2019, 3, 14) + TimeDelta::hours(3), EventStatus::Live, Visibility::Public).await?;

        send_events_list(&ctx, &user, &[event], &house, noon(2019, 3, 14)).await?;

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[REDVIC] Reminder of your events today");
        assert_eq!(sent[0].from, "stay@redvic.lists.example.org");
        assert_eq!(sent[0].to, vec![user.email.clone()]);
        let text = sent[0].text.clone().unwrap();
        assert!(text.contains("Happy Thursday!"));
        assert!(text.contains("- Potluck"));
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_reminder_subject_names_tomorrow() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let user = create_test_user(&ctx.db, "ada").await?;

        weekly_reminder_email(&ctx, &user, &[], &house, noon(2019, 3, 14)).await?;

        let sent = mailer.sent();
        assert_eq!(sent[0].subject, "[REDVIC] Upcoming events for the week of March 15, 2019");
        assert!(sent[0].html.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_weekly_reminder_escapes_titles_in_html() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let user = create_test_user(&ctx.db, "ada").await?;
        let title = "<a href=\"http://evil.example\">Free</a>";
        let event = create_test_event(&ctx.db, house.id, user.id, title, noon(2019, 3, 16), noon(2019, 3, 16) + TimeDelta::hours(2), EventStatus::Live, Visibility::Public).await?;

        weekly_reminder_email(&ctx, &user, &[event], &house, noon(2019, 3, 14)).await?;

        let sent = mailer.sent();
        let html = sent[0].html.clone().unwrap();
        assert!(html.contains("&lt;a href=&quot;http://evil.example&quot;&gt;Free&lt;/a&gt;"));
        assert!(!html.contains("<a href=\"http://evil.example\">"));
        assert!(sent[0].text.clone().unwrap().contains(title));
        Ok(())
    }

    #[tokio::test]
    async fn test_new_booking_goes_to_admins() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let admin = create_test_user(&ctx.db, "admin").await?;
        let guest = create_named_user(&ctx.db, "guest", "Grace", "Hopper").await?;
        add_location_role(&ctx.db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;
        let stay = create_test_stay(&ctx.db, house.id, guest.id, date(2019, 3, 14), date(2019, 3, 16), StayStatus::Pending).await?;
        let detail = stay::load_detail(&ctx.db, stay).await?;

        new_booking_notify(&ctx, &detail, &house).await?;

        let sent = mailer.sent();
        assert_eq!(sent[0].to, vec![admin.email.clone()]);
        assert_eq!(sent[0].subject, "[REDVIC] Booking Request, Grace Hopper, 2019-03-14 - 2019-03-16");
        assert!(sent[0].text.as_ref().unwrap().contains("Status: pending"));
        Ok(())
    }

    #[tokio::test]
    async fn test_booking_notices_skip_locations_without_admins() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let guest = create_test_user(&ctx.db, "guest").await?;
        let stay = create_test_stay(&ctx.db, house.id, guest.id, date(2019, 3, 14), date(2019, 3, 16), StayStatus::Pending).await?;
        let detail = stay::load_detail(&ctx.db, stay).await?;

        assert!(updated_booking_notify(&ctx, &detail, &house).await?.is_none());
        assert!(mailer.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_guest_welcome_and_goodbye() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let guest = create_test_user(&ctx.db, "guest").await?;
        let stay = create_test_stay(&ctx.db, house.id, guest.id, date(2019, 3, 14), date(2019, 3, 16), StayStatus::Confirmed).await?;
        let detail = stay::load_detail(&ctx.db, stay).await?;

        guest_welcome(&ctx, &detail, &house).await?;
        goodbye_email(&ctx, &detail, &house).await?;

        let sent = mailer.sent();
        assert_eq!(sent[0].subject, "[REDVIC] See you on Thursday");
        assert!(sent[0].text.as_ref().unwrap().contains("current@redvic.lists.example.org"));
        assert_eq!(sent[1].subject, "[REDVIC] Thank you for staying with us");
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_daily_update_skips_quiet_days() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let admin = create_test_user(&ctx.db, "admin").await?;
        add_location_role(&ctx.db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;

        assert!(admin_daily_update(&ctx, &house, noon(2019, 3, 14)).await?.is_none());

        let guest = create_test_user(&ctx.db, "guest").await?;
        create_test_stay(&ctx.db, house.id, guest.id, date(2019, 3, 14), date(2019, 3, 16), StayStatus::Confirmed).await?;
        assert!(admin_daily_update(&ctx, &house, noon(2019, 3, 14)).await?.is_some());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[REDVIC] 2019-03-14 Events and Guests");
        Ok(())
    }

    #[tokio::test]
    async fn test_guest_daily_update_excludes_admins() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let admin = create_test_user(&ctx.db, "admin").await?;
        let resident = create_test_user(&ctx.db, "resident").await?;
        let guest = create_test_user(&ctx.db, "guest").await?;
        add_location_role(&ctx.db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;
        add_location_role(&ctx.db, house.id, admin.id, LocationRoleKind::Resident).await?;
        add_location_role(&ctx.db, house.id, resident.id, LocationRoleKind::Resident).await?;
        create_test_stay(&ctx.db, house.id, guest.id, date(2019, 3, 14), date(2019, 3, 16), StayStatus::Confirmed).await?;

        guests_residents_daily_update(&ctx, &house, noon(2019, 3, 14)).await?;

        let sent = mailer.sent();
        assert_eq!(sent[0].to, vec![guest.email.clone(), resident.email.clone()]);
        assert_eq!(sent[0].subject, "[REDVIC] Events, Arrivals and Departures for 2019-03-14");
        Ok(())
    }

    #[tokio::test]
    async fn test_event_email_draft() -> Result<()> {
        let (ctx, _mailer) = test_context().await?;
        let house = create_test_location(&ctx.db, "redvic").await?;
        let host = create_test_user(&ctx.db, "host").await?;
        let guest = create_test_user(&ctx.db, "guest").await?;
        let event = create_test_event(&ctx.db, house.id, host.id, "Potluck", noon(2019, 3, 14), noon(2019, 3, 15), EventStatus::Live, Visibility::Public).await?;
        events::add_participant(&ctx.db, event.id, host.id, ParticipantRole::Organizer).await?;
        events::add_participant(&ctx.db, event.id, guest.id, ParticipantRole::Attendee).await?;

        let draft = event_email_draft(&ctx, &event, &house).await?;
        assert_eq!(draft.subject, "[REDVIC] Potluck");
        assert_eq!(draft.recipients, vec![host.email.clone(), guest.email.clone()]);
        assert!(draft.footer.contains("Potluck at"));
        Ok(())
    }
}
