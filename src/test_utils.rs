//! Shared test utilities for hearth.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::AppConfig,
    context::AppContext,
    core::{account, ledger, location, stay},
    entities::{
        self, AccountRole, EventStatus, LocationRoleKind, StayStatus, Visibility, user_group,
    },
    errors::Result,
    mail::{MailReceipt, Mailer, OutboundMessage, templates::EmailKey},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Routes tracing output through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Calendar date shorthand.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Creates an active user with email `{username}@example.org`.
pub async fn create_test_user(db: &DatabaseConnection, username: &str) -> Result<entities::user::Model> {
    create_named_user(db, username, username, "Tester").await
}

/// Creates an active user with the given names.
pub async fn create_named_user(
    db: &DatabaseConnection,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> Result<entities::user::Model> {
    entities::user::ActiveModel {
        username: Set(username.to_string()),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(format!("{username}@example.org")),
        is_superuser: Set(false),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a superuser.
pub async fn create_superuser(db: &DatabaseConnection, username: &str) -> Result<entities::user::Model> {
    let user = create_test_user(db, username).await?;
    let mut active: entities::user::ActiveModel = user.into();
    active.is_superuser = Set(true);
    active.update(db).await.map_err(Into::into)
}

/// Puts a user in a named group.
pub async fn add_to_group(db: &DatabaseConnection, user_id: i64, name: &str) -> Result<()> {
    user_group::ActiveModel {
        user_id: Set(user_id),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Creates an account nobody owns.
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
    currency: &str,
) -> Result<entities::account::Model> {
    account::create_account(db, name, currency).await
}

/// Creates an account owned by `owner`.
pub async fn create_owned_account(
    db: &DatabaseConnection,
    owner: &entities::user::Model,
    name: &str,
    currency: &str,
) -> Result<entities::account::Model> {
    let created = account::create_account(db, name, currency).await?;
    account::add_member(db, created.id, owner.id, AccountRole::Owner).await?;
    Ok(created)
}

/// Moves `amount` into an account from a fresh issuer account of the same currency.
pub async fn fund_account(db: &DatabaseConnection, account_id: i64, amount: i64) -> Result<()> {
    let target = account::get_account_by_id(db, account_id)
        .await?
        .ok_or(crate::errors::Error::AccountNotFound { id: account_id })?;
    let issuer = account::create_account(db, "Issuer", &target.currency).await?;
    ledger::create_transaction(db, "Initial funding", amount, issuer.id, account_id).await?;
    Ok(())
}

/// Creates a location; `redvic` gets name "Redvic" and prefix "REDVIC".
pub async fn create_test_location(db: &DatabaseConnection, slug: &str) -> Result<entities::location::Model> {
    let mut chars = slug.chars();
    let name = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect::<String>())
        .unwrap_or_default();
    entities::location::ActiveModel {
        slug: Set(slug.to_string()),
        name: Set(name),
        email_subject_prefix: Set(slug.to_uppercase()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Gives a user a role at a location.
pub async fn add_location_role(
    db: &DatabaseConnection,
    location_id: i64,
    user_id: i64,
    role: LocationRoleKind,
) -> Result<()> {
    location::add_role(db, location_id, user_id, role).await?;
    Ok(())
}

/// Creates a bookable room.
pub async fn create_test_resource(
    db: &DatabaseConnection,
    location_id: i64,
    name: &str,
) -> Result<entities::resource::Model> {
    entities::resource::ActiveModel {
        location_id: Set(location_id),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Books a stay in a fresh room.
pub async fn create_test_stay(
    db: &DatabaseConnection,
    location_id: i64,
    user_id: i64,
    arrive: NaiveDate,
    depart: NaiveDate,
    status: StayStatus,
) -> Result<entities::stay::Model> {
    let room = create_test_resource(db, location_id, "Room").await?;
    stay::create_stay(
        db,
        stay::NewStay {
            location_id,
            resource_id: room.id,
            user_id,
            arrive,
            depart,
            status,
            purpose: "Visiting".to_string(),
            comments: None,
        },
    )
    .await
}

/// Creates an event directly, bypassing submission and review.
#[allow(clippy::too_many_arguments)]
pub async fn create_test_event(
    db: &DatabaseConnection,
    location_id: i64,
    creator_id: i64,
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: EventStatus,
    visibility: Visibility,
) -> Result<entities::event::Model> {
    entities::event::ActiveModel {
        location_id: Set(location_id),
        creator_id: Set(creator_id),
        title: Set(title.to_string()),
        slug: Set(crate::core::events::slugify(title)),
        description: Set(String::new()),
        start: Set(start),
        end: Set(end),
        status: Set(status),
        visibility: Set(visibility),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overrides a built-in email template for a location.
pub async fn create_email_template(
    db: &DatabaseConnection,
    location_id: i64,
    key: EmailKey,
    text_body: Option<&str>,
    html_body: Option<&str>,
) -> Result<()> {
    entities::location_email_template::ActiveModel {
        location_id: Set(location_id),
        key: Set(key.as_str().to_string()),
        text_body: Set(text_body.map(ToString::to_string)),
        html_body: Set(html_body.map(ToString::to_string)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Keeps every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundMessage>>,
    rejected: Mutex<Vec<String>>,
}

impl RecordingMailer {
    /// Makes every later message to `address` fail like an API rejection.
    pub fn reject(&self, address: &str) {
        if let Ok(mut rejected) = self.rejected.lock() {
            rejected.push(address.to_string());
        }
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<MailReceipt> {
        let bounced = self
            .rejected
            .lock()
            .map(|rejected| message.to.iter().any(|to| rejected.contains(to)))
            .unwrap_or(false);
        if bounced {
            return Err(crate::errors::Error::MailRejected {
                status: 400,
                body: format!("'to' parameter is not a valid address: {}", message.to.join(", ")),
            });
        }
        let mut sent = self.sent.lock().map_err(|_| crate::errors::Error::Config {
            message: "recording mailer poisoned".to_string(),
        })?;
        sent.push(message.clone());
        Ok(MailReceipt {
            id: Some(format!("<{}@test.example.org>", sent.len())),
            message: "Queued. Thank you.".to_string(),
        })
    }
}

/// A context over a fresh database and a recording mailer.
///
/// Lists live under `lists.example.org`, the site is `hearth.example.org`,
/// and the local time zone is UTC.
pub async fn test_context() -> Result<(AppContext, Arc<RecordingMailer>)> {
    let db = setup_test_db().await?;
    let mut config = AppConfig::default();
    config.mail.list_domain = "lists.example.org".to_string();
    config.site.domain = "hearth.example.org".to_string();
    config.site.time_zone = Tz::UTC;

    let mailer = Arc::new(RecordingMailer::default());
    let ctx = AppContext::new(db, Arc::clone(&mailer) as Arc<dyn Mailer>, Arc::new(config));
    Ok((ctx, mailer))
}
