//! Email templates with per-location overrides.
//!
//! Templates are plain text with `{{ name }}` placeholders. Lists (events,
//! arrivals, ...) are rendered into a single string by the caller before
//! they go into the context. A placeholder with no value renders empty.

use crate::{
    entities::{LocationEmailTemplate, location_email_template},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use std::{collections::BTreeMap, fmt, str::FromStr};
use tracing::debug;

/// Which email a template is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKey {
    Welcome,
    Departure,
    NewBooking,
    AdminDailyUpdate,
    GuestDailyUpdate,
    EventsToday,
    EventsThisWeek,
}

impl EmailKey {
    /// Every key, in the order an admin would see them.
    pub const ALL: [Self; 7] = [
        Self::Welcome,
        Self::Departure,
        Self::NewBooking,
        Self::AdminDailyUpdate,
        Self::GuestDailyUpdate,
        Self::EventsToday,
        Self::EventsThisWeek,
    ];

    /// Key as stored in `location_email_templates.key`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Departure => "departure",
            Self::NewBooking => "newbooking",
            Self::AdminDailyUpdate => "admin_daily_update",
            Self::GuestDailyUpdate => "guest_daily_update",
            Self::EventsToday => "events_today",
            Self::EventsThisWeek => "events_this_week",
        }
    }
}

impl fmt::Display for EmailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::Validation {
                message: format!("Unknown email key: {s}"),
            })
    }
}

/// Values for the placeholders of one email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    values: BTreeMap<String, String>,
}

impl TemplateContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a placeholder value, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a placeholder value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// The value of a placeholder, if set.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Replaces every `{{ name }}` in `template` with its value from `context`.
///
/// An opening `{{` without a closing `}}` is kept as written.
#[must_use]
pub fn render(template: &str, context: &TemplateContext) -> String {
    substitute(template, context, str::to_string)
}

/// Like [`render`], but escapes every value for an HTML body.
///
/// The template's own markup is left alone; only the substituted values,
/// which may carry member-written text, are escaped.
#[must_use]
pub fn render_html(template: &str, context: &TemplateContext) -> String {
    substitute(template, context, escape_html)
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn substitute(template: &str, context: &TemplateContext, encode: fn(&str) -> String) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                out.push_str(&encode(context.get(name).unwrap_or_default()));
                rest = &after_open[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// A rendered email body pair. Either half may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedEmail {
    /// Plain text body, if the template has one
    pub text: Option<String>,
    /// HTML body with escaped values, if the template has one
    pub html: Option<String>,
}

impl RenderedEmail {
    /// Whether there is nothing to send.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.html.is_none()
    }
}

const WELCOME_TEXT: &str = "Hi {{ first_name }},

We're looking forward to having you at {{ location_name }} on {{ day_of_week }}!

Your booking: {{ booking_url }}
Upcoming events: {{ events_url }}
Your profile: {{ profile_url }}

While you're with us, {{ current_email }} reaches everyone currently in the house.

Residents:
{{ residents }}

Others staying at the same time:
{{ intersecting_stays }}

Events during your stay:
{{ intersecting_events }}

See you soon!
";

const WELCOME_HTML: &str = "<p>Hi {{ first_name }},</p>
<p>We're looking forward to having you at {{ location_name }} on {{ day_of_week }}!</p>
<p><a href=\"{{ booking_url }}\">Your booking</a> &middot; <a href=\"{{ events_url }}\">Upcoming events</a></p>
<p>While you're with us, <a href=\"mailto:{{ current_email }}\">{{ current_email }}</a> reaches everyone currently in the house.</p>
<p>See you soon!</p>
";

const DEPARTURE_TEXT: &str = "Hi {{ first_name }},

Thank you for staying with us at {{ location_name }}. We hope you had a wonderful time.

Your booking: {{ booking_url }}
Come back soon: {{ new_booking_url }}
";

const NEW_BOOKING_TEXT: &str = "{{ first_name }} {{ last_name }} requested to stay at {{ location_name }}.

Status: {{ status }}
Room: {{ room_name }}
Dates: {{ arrive }} - {{ depart }}
Purpose: {{ purpose }}
Comments: {{ comments }}

Manage this booking at {{ admin_url }}
";

const ADMIN_DAILY_TEXT: &str = "Today at {{ location_name }} ({{ today }})

Arriving:
{{ arriving }}

Maybe arriving (approved, not confirmed):
{{ maybe_arriving }}

Departing:
{{ departing }}

Pending requests:
{{ pending_now }}

Approved, awaiting confirmation:
{{ approved_now }}

Events today:
{{ events_today }}

Events waiting for approval:
{{ events_pending }}

Events seeking feedback:
{{ events_feedback }}
";

const GUEST_DAILY_TEXT: &str = "Today at {{ location_name }} ({{ today }})

Arriving:
{{ arriving }}

Departing:
{{ departing }}

Events today:
{{ events_today }}
";

const EVENTS_TODAY_TEXT: &str = "Hi {{ first_name }},

Happy {{ day_of_week }}! Here are your events today at {{ location_name }}:

{{ events }}

{{ footer }}
";

const EVENTS_THIS_WEEK_TEXT: &str = "Hi {{ first_name }},

Here is what's happening at {{ location_name }} for the week of {{ week_name }}:

{{ events }}

{{ footer }}
";

const EVENTS_THIS_WEEK_HTML: &str = "<p>Hi {{ first_name }},</p>
<p>Here is what's happening at {{ location_name }} for the week of {{ week_name }}:</p>
<pre>{{ events }}</pre>
<p><small>{{ footer }}</small></p>
";

/// The built-in template pair for a key.
#[must_use]
pub const fn builtin(key: EmailKey) -> (Option<&'static str>, Option<&'static str>) {
    match key {
        EmailKey::Welcome => (Some(WELCOME_TEXT), Some(WELCOME_HTML)),
        EmailKey::Departure => (Some(DEPARTURE_TEXT), None),
        EmailKey::NewBooking => (Some(NEW_BOOKING_TEXT), None),
        EmailKey::AdminDailyUpdate => (Some(ADMIN_DAILY_TEXT), None),
        EmailKey::GuestDailyUpdate => (Some(GUEST_DAILY_TEXT), None),
        EmailKey::EventsToday => (Some(EVENTS_TODAY_TEXT), None),
        EmailKey::EventsThisWeek => (Some(EVENTS_THIS_WEEK_TEXT), Some(EVENTS_THIS_WEEK_HTML)),
    }
}

/// Renders the email `key` for a location.
///
/// A `location_email_templates` row for (location, key) replaces the
/// built-in pair entirely; a body it leaves empty is not sent.
pub async fn render_templates(
    db: &DatabaseConnection,
    location_id: i64,
    key: EmailKey,
    context: &TemplateContext,
) -> Result<RenderedEmail> {
    let override_row = LocationEmailTemplate::find()
        .filter(location_email_template::Column::LocationId.eq(location_id))
        .filter(location_email_template::Column::Key.eq(key.as_str()))
        .one(db)
        .await?;

    let (text, html) = match &override_row {
        Some(row) => {
            debug!("Using location {} override for {}", location_id, key);
            (
                row.text_body.as_deref().filter(|b| !b.is_empty()),
                row.html_body.as_deref().filter(|b| !b.is_empty()),
            )
        }
        None => builtin(key),
    };

    Ok(RenderedEmail {
        text: text.map(|t| render(t, context)),
        html: html.map(|h| render_html(h, context)),
    })
}
