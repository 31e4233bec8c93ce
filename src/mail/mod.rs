//! Email composition and delivery.
//!
//! Outbound mail is described by [`OutboundMessage`] and handed to a
//! [`Mailer`]. In production that is [`mailgun::MailgunMailer`]; tests use a
//! recording implementation.

pub mod inbound;
pub mod mailgun;
pub mod messages;
pub mod templates;

use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// How a file travels with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Regular attachment
    Attachment,
    /// Inline part (referenced from the HTML body)
    Inline,
}

impl Disposition {
    /// Form field name used by the mail API.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

/// A file carried by a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name shown to the recipient
    pub filename: String,
    /// MIME type, when the sender gave one
    pub content_type: Option<String>,
    /// Raw bytes
    pub data: Vec<u8>,
    /// Attached or inline
    pub disposition: Disposition,
}

/// One message to hand to the mail API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Sender, possibly `Name <addr>`
    pub from: String,
    /// Visible recipients
    pub to: Vec<String>,
    /// Hidden recipients, used for list relays
    pub bcc: Vec<String>,
    /// Subject line, already prefixed
    pub subject: String,
    /// Plain text body
    pub text: Option<String>,
    /// HTML body
    pub html: Option<String>,
    /// Extra headers, sent as `h:<Name>` fields
    pub headers: Vec<(String, String)>,
    /// Files to send along
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    /// Value of an extra header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What the mail API said about an accepted message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MailReceipt {
    /// Message id assigned by the API
    #[serde(default)]
    pub id: Option<String>,
    /// Status text from the API
    #[serde(default)]
    pub message: String,
}

/// Something that can deliver an [`OutboundMessage`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    async fn send(&self, message: &OutboundMessage) -> Result<MailReceipt>;
}

/// Removes duplicate addresses, keeping the first occurrence of each.
pub fn dedupe_addresses<I, S>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut unique: Vec<String> = Vec::new();
    for address in addresses {
        let address = address.into();
        if !unique.contains(&address) {
            unique.push(address);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let unique = dedupe_addresses(["b@x.org", "a@x.org", "b@x.org", "c@x.org", "a@x.org"]);
        assert_eq!(unique, vec!["b@x.org", "a@x.org", "c@x.org"]);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let message = OutboundMessage {
            headers: vec![("List-Id".to_string(), "current@redvic.lists.example.org".to_string())],
            ..Default::default()
        };
        assert_eq!(message.header("list-id"), Some("current@redvic.lists.example.org"));
        assert_eq!(message.header("Reply-To"), None);
    }
}
