//! Periodic jobs, run by an external scheduler.
//!
//! Each job walks every location and sends whatever is due. Jobs take `now`
//! explicitly so "today" is computed once per run. A message that fails is
//! logged and counted; the rest of the run carries on.

use crate::{
    context::AppContext,
    core::{events, localtime, location as locations, stay},
    entities::{StayStatus, event, user},
    errors::{Error, Result},
    mail::{MailReceipt, messages},
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::{debug, error, info, warn};

/// A schedulable job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Remind participants of today's events
    EventsTodayReminder,
    /// Send the weekly events digest to subscribers
    WeeklyUpcomingEvents,
    /// Morning digest for house admins
    AdminDailyUpdate,
    /// Morning digest for guests and residents
    GuestsResidentsDailyUpdate,
    /// Welcome guests arriving tomorrow
    GuestWelcome,
    /// Thank guests departing today
    DepartureEmail,
}

impl Job {
    /// Every job.
    pub const ALL: [Self; 6] = [
        Self::EventsTodayReminder,
        Self::WeeklyUpcomingEvents,
        Self::AdminDailyUpdate,
        Self::GuestsResidentsDailyUpdate,
        Self::GuestWelcome,
        Self::DepartureEmail,
    ];

    /// Name used on the command line and in `/jobs/:job`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EventsTodayReminder => "events_today_reminder",
            Self::WeeklyUpcomingEvents => "weekly_upcoming_events",
            Self::AdminDailyUpdate => "admin_daily_update",
            Self::GuestsResidentsDailyUpdate => "guests_residents_daily_update",
            Self::GuestWelcome => "send_guest_welcome",
            Self::DepartureEmail => "send_departure_email",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Job {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|job| job.name() == s)
            .ok_or_else(|| Error::Validation {
                message: format!("Unknown job: {s}"),
            })
    }
}

/// Counts of what a job run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobReport {
    /// Emails accepted by the mailer
    pub sent: usize,
    /// Emails that could not be composed or sent
    pub failed: usize,
}

impl JobReport {
    fn record(&mut self, outcome: Result<Option<MailReceipt>>, what: &str) {
        match outcome {
            Ok(Some(_)) => self.sent += 1,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to send {}: {}", what, e);
                self.failed += 1;
            }
        }
    }
}

/// Runs one job and reports how many emails it sent and how many failed.
///
/// # Errors
/// Only lookups that stop the whole run fail it; individual sends are counted instead.
pub async fn run_job(ctx: &AppContext, job: Job, now: DateTime<Utc>) -> Result<JobReport> {
    info!("Running task: {}", job);
    let report = match job {
        Job::EventsTodayReminder => events_today_reminder(ctx, now).await?,
        Job::WeeklyUpcomingEvents => weekly_upcoming_events(ctx, now).await?,
        Job::AdminDailyUpdate => daily_updates(ctx, now, true).await?,
        Job::GuestsResidentsDailyUpdate => daily_updates(ctx, now, false).await?,
        Job::GuestWelcome => send_guest_welcome(ctx, now).await?,
        Job::DepartureEmail => send_departure_email(ctx, now).await?,
    };
    if report.failed > 0 {
        warn!("Task {} finished, {} email(s) sent, {} failed", job, report.sent, report.failed);
    } else {
        info!("Task {} finished, {} email(s) sent", job, report.sent);
    }
    Ok(report)
}

/// One email per participant with reminders on, listing all their events today.
pub async fn events_today_reminder(ctx: &AppContext, now: DateTime<Utc>) -> Result<JobReport> {
    let tz = ctx.config.site.time_zone;
    let mut report = JobReport::default();

    for location in locations::all_locations(&ctx.db).await? {
        let today = events::published_events_today_local(&ctx.db, location.id, now, &tz).await?;
        if today.is_empty() {
            continue;
        }

        let mut per_person: Vec<(user::Model, Vec<event::Model>)> = Vec::new();
        for event in &today {
            for person in events::participants(&ctx.db, event.id).await? {
                if !events::reminders_enabled(&ctx.db, person.id).await? {
                    continue;
                }
                match per_person.iter_mut().find(|(u, _)| u.id == person.id) {
                    Some((_, list)) => list.push(event.clone()),
                    None => per_person.push((person, vec![event.clone()])),
                }
            }
        }

        for (person, list) in &per_person {
            let outcome = messages::send_events_list(ctx, person, list, &location, now).await;
            report.record(outcome, &format!("event reminder to {}", person.email));
        }
    }
    Ok(report)
}

/// The weekly digest, for every location with public events coming up.
pub async fn weekly_upcoming_events(ctx: &AppContext, now: DateTime<Utc>) -> Result<JobReport> {
    let tz = ctx.config.site.time_zone;
    let mut report = JobReport::default();

    for location in locations::all_locations(&ctx.db).await? {
        let week = events::published_events_this_week_local(&ctx.db, location.id, now, &tz).await?;
        if week.is_empty() {
            debug!("no events this week at {}; skipping email notification", location.name);
            continue;
        }
        for subscriber in locations::weekly_subscribers(&ctx.db, location.id).await? {
            let outcome = messages::weekly_reminder_email(ctx, &subscriber, &week, &location, now).await;
            report.record(outcome, &format!("weekly events to {}", subscriber.email));
        }
    }
    Ok(report)
}

async fn daily_updates(ctx: &AppContext, now: DateTime<Utc>, admins: bool) -> Result<JobReport> {
    let mut report = JobReport::default();
    for location in locations::all_locations(&ctx.db).await? {
        let outcome = if admins {
            messages::admin_daily_update(ctx, &location, now).await
        } else {
            messages::guests_residents_daily_update(ctx, &location, now).await
        };
        report.record(outcome, &format!("daily update for {}", location.slug));
    }
    Ok(report)
}

/// Welcome emails for confirmed guests arriving tomorrow.
pub async fn send_guest_welcome(ctx: &AppContext, now: DateTime<Utc>) -> Result<JobReport> {
    let tomorrow = localtime::local_today(now, &ctx.config.site.time_zone) + TimeDelta::days(1);
    let mut report = JobReport::default();
    for location in locations::all_locations(&ctx.db).await? {
        for arriving in stay::arriving_on(&ctx.db, location.id, tomorrow, StayStatus::Confirmed).await? {
            let detail = stay::load_detail(&ctx.db, arriving).await?;
            let outcome = messages::guest_welcome(ctx, &detail, &location).await;
            report.record(outcome, &format!("welcome for stay {}", detail.stay.id));
        }
    }
    Ok(report)
}

/// Departure emails for confirmed guests leaving today.
pub async fn send_departure_email(ctx: &AppContext, now: DateTime<Utc>) -> Result<JobReport> {
    let today = localtime::local_today(now, &ctx.config.site.time_zone);
    let mut report = JobReport::default();
    for location in locations::all_locations(&ctx.db).await? {
        for departing in stay::departing_on(&ctx.db, location.id, today).await? {
            let detail = stay::load_detail(&ctx.db, departing).await?;
            let outcome = messages::goodbye_email(ctx, &detail, &location).await;
            report.record(outcome, &format!("departure email for stay {}", detail.stay.id));
        }
    }
    Ok(report)
}
