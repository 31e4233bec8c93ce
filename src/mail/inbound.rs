//! Inbound mailing-list relays.
//!
//! The mail provider posts every message sent to a list address
//! (`current@`, `residents@`, `stay@`, `test@`, `announce@` under
//! `{slug}.{list_domain}`) to a webhook. Each relay works out who should
//! receive it, tags the subject, appends a footer and sends it back out
//! through the mail API with `List-Id` set.
//!
//! Because relayed copies can come back to us (a member's address forwards
//! to another list, an autoresponder replies), anything that already carries
//! a `List-Id` or an `Auto-Submitted` header is dropped. The provider retries
//! on anything other than 200, so every drop is still a success to it.

use super::{Attachment, Disposition, MailReceipt, OutboundMessage, dedupe_addresses};
use crate::{
    context::AppContext,
    core::{localtime, location as locations, stay},
    entities::{User, location, user},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::prelude::*;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

const FOOTER_RULE_TEXT: &str = "\n\n-------------------------------------------\n";
const FOOTER_RULE_HTML: &str = "<br><br>-------------------------------------------<br>";

/// The relayed lists of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Everyone in the house today: current guests, residents, house admins
    Current,
    /// Residents
    Residents,
    /// House admins; also the location's from-address
    Stay,
    /// Configured test recipients
    Test,
}

impl ListKind {
    /// Local part of the list address.
    #[must_use]
    pub const fn local_part(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Residents => "residents",
            Self::Stay => "stay",
            Self::Test => "test",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Current => "[Current Guests and Residents] ",
            Self::Stay => "[Admin] ",
            Self::Residents | Self::Test => "",
        }
    }

    fn footer(self, location: &location::Model, recipient: &str) -> String {
        match self {
            Self::Current => format!(
                "You are receiving this email because you are a current guest or resident at {}. \
                 This list is used to share questions, ideas and activities with others currently \
                 at this location. Feel free to respond.",
                location.name
            ),
            Self::Residents => format!("*~*~*~* {} residents email list *~*~*~* ", location.name),
            Self::Stay => format!(
                "You are receiving email to {recipient} because you are a location admin at {}. \
                 Send mail to this list to reach other admins.",
                location.name
            ),
            Self::Test => format!(
                "You are receiving this email because someone at {} wanted to use you as a guinea pig.",
                location.name
            ),
        }
    }
}

/// Why a message was not relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No location with the slug in the URL
    UnknownLocation,
    /// Headers missing or not the expected JSON
    MalformedHeaders,
    /// We relayed this message already
    AlreadyRelayed,
    /// Sent by an autoresponder
    AutoSubmitted,
    /// The sender is not allowed to post to this list
    SenderNotAllowed,
}

/// What became of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Sent on to the list
    Relayed(MailReceipt),
    /// Announcement sent to this many subscribers
    Announced(usize),
    /// Logged and otherwise ignored
    Dropped(DropReason),
    /// Accepted with nothing to do
    Ignored,
}

/// A message as posted by the provider's webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// List address it was sent to
    pub recipient: String,
    /// Envelope sender (bare address)
    pub sender: String,
    /// `From` header, possibly `Name <addr>`
    pub from: String,
    /// Subject as sent, before any list prefix
    pub subject: String,
    /// Plain text body
    pub body_plain: String,
    /// HTML body, when the sender included one
    pub body_html: Option<String>,
    /// Original headers, in order
    pub headers: Vec<(String, String)>,
    /// Top-level `List-Id` form field, when the provider sends one
    pub list_id_field: Option<String>,
    /// Files to carry over to the relayed message
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    /// Builds a message from webhook form fields.
    ///
    /// # Errors
    /// * [`Error::MalformedMessage`] if `message-headers` is missing or not a
    ///   JSON list of `[name, value]` pairs
    pub fn from_fields(fields: &HashMap<String, String>, attachments: Vec<Attachment>) -> Result<Self> {
        let raw_headers = fields.get("message-headers").ok_or_else(|| Error::MalformedMessage {
            message: "missing message-headers".to_string(),
        })?;
        let headers: Vec<(String, String)> =
            serde_json::from_str(raw_headers).map_err(|e| Error::MalformedMessage {
                message: format!("message-headers is not a list of pairs: {e}"),
            })?;
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        Ok(Self {
            recipient: field("recipient"),
            sender: field("sender"),
            from: field("from"),
            subject: field("subject"),
            body_plain: field("body-plain"),
            body_html: fields.get("body-html").filter(|b| !b.is_empty()).cloned(),
            headers,
            list_id_field: fields.get("List-Id").filter(|v| !v.is_empty()).cloned(),
            attachments,
        })
    }

    /// Whether a header with this name is present, ignoring case.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Why this message must not be relayed again, if it must not.
    #[must_use]
    pub fn loop_guard(&self) -> Option<DropReason> {
        if self.list_id_field.is_some() || self.has_header("List-Id") {
            Some(DropReason::AlreadyRelayed)
        } else if self.has_header("Auto-Submitted") {
            Some(DropReason::AutoSubmitted)
        } else {
            None
        }
    }
}

/// The bare address in a `From` value such as `Ada Lovelace <ada@example.org>`.
#[must_use]
pub fn email_address(from: &str) -> &str {
    match (from.rfind('<'), from.rfind('>')) {
        (Some(open), Some(close)) if open < close => from[open + 1..close].trim(),
        _ => from.trim(),
    }
}

fn with_footer(body: &str, rule: &str, footer: &str) -> String {
    format!("{body}{rule}{footer}")
}

/// Tags `subject` unless the location's prefix is already in it (replies).
#[must_use]
pub fn tagged_subject(kind: ListKind, location: &location::Model, subject: &str) -> String {
    let prefix = &location.email_subject_prefix;
    match kind {
        ListKind::Test => {
            let marker = format!("{prefix} Test");
            if subject.contains(&marker) {
                subject.to_string()
            } else {
                format!("[{marker}!] {subject}")
            }
        }
        _ if subject.contains(prefix.as_str()) => subject.to_string(),
        _ => format!("[{prefix}] {}{subject}", kind.tag()),
    }
}

async fn is_registered(db: &DatabaseConnection, address: &str) -> Result<bool> {
    Ok(User::find()
        .filter(user::Column::Email.eq(address))
        .one(db)
        .await?
        .is_some())
}

async fn list_members(
    ctx: &AppContext,
    kind: ListKind,
    location: &location::Model,
    now: DateTime<Utc>,
) -> Result<Vec<String>> {
    let db = &ctx.db;
    let emails: Vec<String> = match kind {
        ListKind::Current => {
            let today = localtime::local_today(now, &ctx.config.site.time_zone);
            let mut emails: Vec<String> = stay::confirmed_on_date(db, location.id, today)
                .await?
                .into_iter()
                .map(|(_, guest)| guest.email)
                .collect();
            emails.extend(locations::residents(db, location.id).await?.into_iter().map(|u| u.email));
            emails.extend(locations::house_admins(db, location.id).await?.into_iter().map(|u| u.email));
            emails
        }
        ListKind::Residents => locations::residents(db, location.id)
            .await?
            .into_iter()
            .map(|u| u.email)
            .collect(),
        ListKind::Stay => locations::house_admins(db, location.id)
            .await?
            .into_iter()
            .map(|u| u.email)
            .collect(),
        ListKind::Test => ctx.config.mail.test_recipients.clone(),
    };
    Ok(dedupe_addresses(emails))
}

/// Relays a message posted to one of a location's lists.
pub async fn relay(
    ctx: &AppContext,
    location_slug: &str,
    kind: ListKind,
    message: Result<InboundMessage>,
    now: DateTime<Utc>,
) -> Result<InboundOutcome> {
    let Some(location) = locations::get_location(&ctx.db, location_slug).await? else {
        error!("location not found: {}", location_slug);
        return Ok(InboundOutcome::Dropped(DropReason::UnknownLocation));
    };
    debug!("{}@ for location: {}", kind.local_part(), location.slug);

    let mut message = match message {
        Ok(message) => message,
        Err(e) => {
            error!("Dropping message to {}@{}: {}", kind.local_part(), location.slug, e);
            return Ok(InboundOutcome::Dropped(DropReason::MalformedHeaders));
        }
    };

    if let Some(reason) = message.loop_guard() {
        match reason {
            DropReason::AutoSubmitted => info!("message appears to be auto-submitted. reject silently"),
            _ => debug!("List-Id header was found! Dropping message silently"),
        }
        return Ok(InboundOutcome::Dropped(reason));
    }

    if kind == ListKind::Current && !is_registered(&ctx.db, email_address(&message.from)).await? {
        warn!("Sender ({}) is not a registered user. Exiting quietly.", message.from);
        return Ok(InboundOutcome::Dropped(DropReason::SenderNotAllowed));
    }

    let mut bcc = list_members(ctx, kind, &location, now).await?;
    if kind != ListKind::Test {
        bcc.retain(|address| !address.eq_ignore_ascii_case(&message.sender));
    }
    debug!("bcc list: {:?}", bcc);

    let subject = tagged_subject(kind, &location, &message.subject);
    debug!("subject: {}", subject);

    let footer = kind.footer(&location, &message.recipient);
    let text = with_footer(&message.body_plain, FOOTER_RULE_TEXT, &footer);
    let html = message
        .body_html
        .as_deref()
        .map(|html| with_footer(html, FOOTER_RULE_HTML, &footer));

    let list_address = locations::list_address(&location, kind.local_part(), ctx.list_domain());
    let reply_to = match kind {
        ListKind::Current | ListKind::Residents => list_address.clone(),
        ListKind::Stay | ListKind::Test => message.from.clone(),
    };

    let mut attachments = std::mem::take(&mut message.attachments);
    if kind == ListKind::Test {
        for attachment in &mut attachments {
            attachment.disposition = Disposition::Inline;
        }
    }

    let outbound = OutboundMessage {
        from: message.from,
        to: vec![message.recipient],
        bcc,
        subject,
        text: Some(text),
        html,
        headers: vec![
            ("List-Id".to_string(), list_address),
            ("Precedence".to_string(), "list".to_string()),
            ("Reply-To".to_string(), reply_to),
        ],
        attachments,
    };
    let receipt = ctx.mailer.send(&outbound).await?;
    Ok(InboundOutcome::Relayed(receipt))
}

/// Sends a message from an event admin to every weekly-digest subscriber.
pub async fn announce(
    ctx: &AppContext,
    location_slug: &str,
    message: Result<InboundMessage>,
) -> Result<InboundOutcome> {
    let Some(location) = locations::get_location(&ctx.db, location_slug).await? else {
        error!("location not found: {}", location_slug);
        return Ok(InboundOutcome::Dropped(DropReason::UnknownLocation));
    };
    debug!("announce@ for location: {}", location.slug);

    let message = match message {
        Ok(message) => message,
        Err(e) => {
            error!("Dropping announcement for {}: {}", location.slug, e);
            return Ok(InboundOutcome::Dropped(DropReason::MalformedHeaders));
        }
    };
    if let Some(reason) = message.loop_guard() {
        debug!("Dropping announcement that was already relayed or auto-submitted");
        return Ok(InboundOutcome::Dropped(reason));
    }

    // The from field may be "Name <addr>", so match the address anywhere in it.
    let event_admins = locations::event_admins(&ctx.db, location.id).await?;
    if !event_admins.iter().any(|admin| message.from.contains(&admin.email)) {
        warn!("Sender ({}) not allowed.  Exiting quietly.", message.from);
        return Ok(InboundOutcome::Dropped(DropReason::SenderNotAllowed));
    }

    let footer = format!("*~*~*~* {} Announce *~*~*~* ", location.name);
    let template = OutboundMessage {
        from: locations::from_email(&location, ctx.list_domain()),
        subject: format!("{}{}", locations::subject_prefix(&location), message.subject),
        text: Some(with_footer(&message.body_plain, FOOTER_RULE_TEXT, &footer)),
        html: message
            .body_html
            .as_deref()
            .map(|html| with_footer(html, FOOTER_RULE_HTML, &footer)),
        attachments: message.attachments,
        ..Default::default()
    };

    let subscribers = locations::weekly_subscribers(&ctx.db, location.id).await?;
    for subscriber in &subscribers {
        let outbound = OutboundMessage {
            to: vec![subscriber.email.clone()],
            ..template.clone()
        };
        ctx.mailer.send(&outbound).await?;
    }
    info!("Announcement sent to {} subscriber(s) of {}", subscribers.len(), location.slug);
    Ok(InboundOutcome::Announced(subscribers.len()))
}

/// Unsubscribe requests are only logged.
pub async fn unsubscribe(db: &DatabaseConnection, location_slug: &str) -> Result<InboundOutcome> {
    match locations::get_location(db, location_slug).await? {
        Some(location) => debug!("unsubscribe@ for location: {}", location.slug),
        None => debug!("unsubscribe@ for unknown location {}", location_slug),
    }
    Ok(InboundOutcome::Ignored)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{entities::{LocationRoleKind, StayStatus}, test_utils::*};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 3, 14, 12, 0, 0).unwrap()
    }

    fn fields(headers: &str) -> HashMap<String, String> {
        HashMap::from([
            ("message-headers".to_string(), headers.to_string()),
            ("recipient".to_string(), "current@redvic.lists.example.org".to_string()),
            ("sender".to_string(), "resident@example.org".to_string()),
            ("from".to_string(), "Resident <resident@example.org>".to_string()),
            ("subject".to_string(), "Dinner tonight".to_string()),
            ("body-plain".to_string(), "Who is cooking?".to_string()),
        ])
    }

    fn message() -> Result<InboundMessage> {
        InboundMessage::from_fields(&fields(r#"[["Subject", "Dinner tonight"]]"#), Vec::new())
    }

    async fn house_with_people(db: &DatabaseConnection) -> Result<location::Model> {
        let house = create_test_location(db, "redvic").await?;
        let admin = create_test_user(db, "admin").await?;
        let resident = create_test_user(db, "resident").await?;
        let guest = create_test_user(db, "guest").await?;
        let gone = create_test_user(db, "gone").await?;
        add_location_role(db, house.id, admin.id, LocationRoleKind::HouseAdmin).await?;
        add_location_role(db, house.id, admin.id, LocationRoleKind::Resident).await?;
        add_location_role(db, house.id, resident.id, LocationRoleKind::Resident).await?;
        create_test_stay(db, house.id, guest.id, date(2019, 3, 10), date(2019, 3, 20), StayStatus::Confirmed).await?;
        create_test_stay(db, house.id, gone.id, date(2019, 3, 1), date(2019, 3, 5), StayStatus::Confirmed).await?;
        Ok(house)
    }

    #[test]
    fn test_email_address_extraction() {
        assert_eq!(email_address("Ada Lovelace <ada@example.org>"), "ada@example.org");
        assert_eq!(email_address(" ada@example.org "), "ada@example.org");
    }

    #[test]
    fn test_malformed_headers_are_an_error() {
        let result = InboundMessage::from_fields(&fields("not json"), Vec::new());
        assert!(matches!(result, Err(Error::MalformedMessage { .. })));

        let mut missing = fields("[]");
        missing.remove("message-headers");
        assert!(InboundMessage::from_fields(&missing, Vec::new()).is_err());
    }

    #[test]
    fn test_loop_guard() {
        let relayed = InboundMessage::from_fields(&fields(r#"[["list-id", "current@x"]]"#), Vec::new()).unwrap();
        assert_eq!(relayed.loop_guard(), Some(DropReason::AlreadyRelayed));

        let mut with_field = fields("[]");
        with_field.insert("List-Id".to_string(), "current@x".to_string());
        let relayed = InboundMessage::from_fields(&with_field, Vec::new()).unwrap();
        assert_eq!(relayed.loop_guard(), Some(DropReason::AlreadyRelayed));

        let auto = InboundMessage::from_fields(&fields(r#"[["Auto-Submitted", "auto-replied"]]"#), Vec::new()).unwrap();
        assert_eq!(auto.loop_guard(), Some(DropReason::AutoSubmitted));

        assert_eq!(message().unwrap().loop_guard(), None);
    }

    #[tokio::test]
    async fn test_tagged_subject_respects_replies() -> Result<()> {
        let db = setup_test_db().await?;
        let house = create_test_location(&db, "redvic").await?;
        assert_eq!(
            tagged_subject(ListKind::Current, &house, "Dinner"),
            "[REDVIC] [Current Guests and Residents] Dinner"
        );
        assert_eq!(tagged_subject(ListKind::Stay, &house, "Dinner"), "[REDVIC] [Admin] Dinner");
        assert_eq!(tagged_subject(ListKind::Residents, &house, "Dinner"), "[REDVIC] Dinner");
        assert_eq!(tagged_subject(ListKind::Residents, &house, "Re: [REDVIC] Dinner"), "Re: [REDVIC] Dinner");
        assert_eq!(tagged_subject(ListKind::Test, &house, "Dinner"), "[REDVIC Test!] Dinner");
        Ok(())
    }

    #[tokio::test]
    async fn test_current_relay() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        let outcome = relay(&ctx, "redvic", ListKind::Current, message(), now()).await?;
        assert!(matches!(outcome, InboundOutcome::Relayed(_)));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let relayed = &sent[0];
        // guest, then residents, then admins; sender removed; admin listed once
        assert_eq!(relayed.bcc, vec!["guest@example.org", "admin@example.org"]);
        assert_eq!(relayed.from, "Resident <resident@example.org>");
        assert_eq!(relayed.to, vec!["current@redvic.lists.example.org"]);
        assert_eq!(relayed.subject, "[REDVIC] [Current Guests and Residents] Dinner tonight");
        assert_eq!(relayed.header("List-Id"), Some("current@redvic.lists.example.org"));
        assert_eq!(relayed.header("Precedence"), Some("list"));
        assert_eq!(relayed.header("Reply-To"), Some("current@redvic.lists.example.org"));
        assert!(relayed.text.as_ref().unwrap().contains("current guest or resident at Redvic"));
        assert!(relayed.html.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_relayed_copy_is_not_sent_again() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        let again = InboundMessage::from_fields(&fields(r#"[["List-Id", "current@redvic.lists.example.org"]]"#), Vec::new());
        let outcome = relay(&ctx, "redvic", ListKind::Current, again, now()).await?;
        assert_eq!(outcome, InboundOutcome::Dropped(DropReason::AlreadyRelayed));
        assert!(mailer.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_current_requires_registered_sender() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        let mut stranger = fields("[]");
        stranger.insert("from".to_string(), "Spammer <spam@nowhere.example>".to_string());
        let outcome = relay(&ctx, "redvic", ListKind::Current, InboundMessage::from_fields(&stranger, Vec::new()), now()).await?;
        assert_eq!(outcome, InboundOutcome::Dropped(DropReason::SenderNotAllowed));
        assert!(mailer.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_location_and_bad_headers_are_dropped() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        let outcome = relay(&ctx, "nowhere", ListKind::Stay, message(), now()).await?;
        assert_eq!(outcome, InboundOutcome::Dropped(DropReason::UnknownLocation));

        let bad = InboundMessage::from_fields(&fields("{"), Vec::new());
        let outcome = relay(&ctx, "redvic", ListKind::Stay, bad, now()).await?;
        assert_eq!(outcome, InboundOutcome::Dropped(DropReason::MalformedHeaders));
        assert!(mailer.sent().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stay_relay_replies_to_sender() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        let mut to_admins = fields(r#"[["Subject", "Question"]]"#);
        to_admins.insert("recipient".to_string(), "stay@redvic.lists.example.org".to_string());
        to_admins.insert("body-html".to_string(), "<p>Hello</p>".to_string());
        relay(&ctx, "redvic", ListKind::Stay, InboundMessage::from_fields(&to_admins, Vec::new()), now()).await?;

        let relayed = &mailer.sent()[0];
        assert_eq!(relayed.bcc, vec!["admin@example.org"]);
        assert_eq!(relayed.subject, "[REDVIC] [Admin] Dinner tonight");
        assert_eq!(relayed.header("Reply-To"), Some("Resident <resident@example.org>"));
        assert_eq!(relayed.header("List-Id"), Some("stay@redvic.lists.example.org"));
        assert!(relayed.html.as_ref().unwrap().starts_with("<p>Hello</p><br><br>---"));
        assert!(relayed.text.as_ref().unwrap().contains("email to stay@redvic.lists.example.org because"));
        Ok(())
    }

    #[tokio::test]
    async fn test_residents_relay_excludes_sender() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        house_with_people(&ctx.db).await?;

        relay(&ctx, "redvic", ListKind::Residents, message(), now()).await?;

        let relayed = &mailer.sent()[0];
        assert_eq!(relayed.bcc, vec!["admin@example.org"]);
        assert_eq!(relayed.subject, "[REDVIC] Dinner tonight");
        assert_eq!(relayed.header("Reply-To"), Some("residents@redvic.lists.example.org"));
        Ok(())
    }

    #[tokio::test]
    async fn test_test_list_keeps_sender() -> Result<()> {
        let (mut ctx, mailer) = test_context().await?;
        let mut config = (*ctx.config).clone();
        config.mail.test_recipients = vec!["resident@example.org".to_string(), "qa@example.org".to_string()];
        ctx.config = std::sync::Arc::new(config);
        house_with_people(&ctx.db).await?;

        let attachment = Attachment {
            filename: "a.txt".to_string(),
            content_type: None,
            data: b"x".to_vec(),
            disposition: Disposition::Attachment,
        };
        let with_file = InboundMessage::from_fields(&fields("[]"), vec![attachment]);
        relay(&ctx, "redvic", ListKind::Test, with_file, now()).await?;

        let relayed = &mailer.sent()[0];
        assert_eq!(relayed.bcc, vec!["resident@example.org", "qa@example.org"]);
        assert_eq!(relayed.attachments[0].disposition, Disposition::Inline);
        Ok(())
    }

    #[tokio::test]
    async fn test_announce_only_from_event_admins() -> Result<()> {
        let (ctx, mailer) = test_context().await?;
        let house = house_with_people(&ctx.db).await?;
        let organizer = create_test_user(&ctx.db, "organizer").await?;
        let fan = create_test_user(&ctx.db, "fan").await?;
        let other_fan = create_test_user(&ctx.db, "otherfan").await?;
        add_location_role(&ctx.db, house.id, organizer.id, LocationRoleKind::EventAdmin).await?;
        locations::subscribe_weekly(&ctx.db, house.id, fan.id).await?;
        locations::subscribe_weekly(&ctx.db, house.id, other_fan.id).await?;

        let outcome = announce(&ctx, "redvic", message()).await?;
        assert_eq!(outcome, InboundOutcome::Dropped(DropReason::SenderNotAllowed));

        let mut from_organizer = fields("[]");
        from_organizer.insert("from".to_string(), "The Organizer <organizer@example.org>".to_string());
        let outcome = announce(&ctx, "redvic", InboundMessage::from_fields(&from_organizer, Vec::new())).await?;
        assert_eq!(outcome, InboundOutcome::Announced(2));

        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["fan@example.org"]);
        assert_eq!(sent[1].to, vec!["otherfan@example.org"]);
        assert_eq!(sent[0].from, "stay@redvic.lists.example.org");
        assert_eq!(sent[0].subject, "[REDVIC] Dinner tonight");
        assert!(sent[0].text.as_ref().unwrap().ends_with("*~*~*~* Redvic Announce *~*~*~* "));
        Ok(())
    }

    #[tokio::test]
    async fn test_unsubscribe_is_accepted() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(unsubscribe(&db, "anywhere").await?, InboundOutcome::Ignored);
        Ok(())
    }
}
