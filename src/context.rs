//! Shared application state handed to handlers and jobs.

use crate::{config::AppConfig, mail::Mailer};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Database, mail delivery and configuration, cheap to clone.
#[derive(Clone)]
pub struct AppContext {
    /// Connection pool
    pub db: DatabaseConnection,
    /// Outbound mail
    pub mailer: Arc<dyn Mailer>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
}

impl AppContext {
    /// Bundles the pieces together.
    #[must_use]
    pub fn new(db: DatabaseConnection, mailer: Arc<dyn Mailer>, config: Arc<AppConfig>) -> Self {
        Self { db, mailer, config }
    }

    /// Domain hosting the per-location list addresses.
    #[must_use]
    pub fn list_domain(&self) -> &str {
        &self.config.mail.list_domain
    }

    /// Absolute `https` URL for a site path.
    #[must_use]
    pub fn site_url(&self, path: &str) -> String {
        format!("https://{}{path}", self.config.site.domain)
    }
}
