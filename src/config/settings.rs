//! Application settings loaded from `config.toml`.
//!
//! Every field has a default, so a deployment without a config file still
//! starts. Secrets never live in the file: the mail API key is read from
//! `MAILGUN_API_KEY` after the file is parsed.

use crate::errors::{Error, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use tracing::{debug, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Public site settings
    pub site: SiteConfig,
    /// Outbound and list mail settings
    pub mail: MailConfig,
}

/// `[server]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_address: String,
    /// Where anonymous users are sent by the access checks
    pub login_url: String,
    /// Header the authenticating proxy uses to name the user
    pub user_header: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            login_url: "/people/login/".to_string(),
            user_header: "x-remote-user".to_string(),
        }
    }
}

/// `[site]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Public domain used in links inside emails
    pub domain: String,
    /// Time zone defining "today" and "this week" for reminders
    #[serde(deserialize_with = "deserialize_time_zone")]
    pub time_zone: Tz,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "localhost:8000".to_string(),
            time_zone: Tz::UTC,
        }
    }
}

/// `[mail]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Base URL of the mail API, without the domain component
    pub api_base_url: String,
    /// Domain the API sends from
    pub sending_domain: String,
    /// Domain hosting the per-location list addresses
    pub list_domain: String,
    /// Recipients of the `test@` list
    pub test_recipients: Vec<String>,
    /// API key, from `MAILGUN_API_KEY`
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.mailgun.net/v3".to_string(),
            sending_domain: "mail.example.org".to_string(),
            list_domain: "mail.example.org".to_string(),
            test_recipients: Vec::new(),
            api_key: None,
        }
    }
}

fn deserialize_time_zone<'de, D>(deserializer: D) -> std::result::Result<Tz, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse::<Tz>().map_err(serde::de::Error::custom)
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or its contents are invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads the application configuration.
///
/// Reads the file named by `HEARTH_CONFIG` (default `config.toml`), falling back to
/// defaults when it does not exist, then applies secrets from the environment.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("HEARTH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        warn!("No configuration file at {path}, using defaults");
        AppConfig::default()
    };

    config.mail.api_key = std::env::var("MAILGUN_API_KEY").ok();
    if config.mail.api_key.is_none() {
        warn!("MAILGUN_API_KEY is not set; outbound mail will be rejected by the API");
    }

    info!(
        "Configuration loaded (site {}, time zone {})",
        config.site.domain, config.site.time_zone
    );
    Ok(config)
}
