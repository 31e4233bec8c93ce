//! Mailgun-style HTTP mail API client.
//!
//! Messages are posted as a multipart form to `{api_base_url}/{domain}/messages`
//! with basic auth (`api`, key). Recipient lists repeat the `to` and `bcc`
//! fields; extra headers become `h:<Name>` fields.

use super::{MailReceipt, Mailer, OutboundMessage};
use crate::{
    config::MailConfig,
    errors::{Error, Result},
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, error};

/// Sends mail through the configured API.
#[derive(Debug, Clone)]
pub struct MailgunMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl MailgunMailer {
    /// Builds a client from the `[mail]` settings.
    #[must_use]
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/{}/messages",
                config.api_base_url.trim_end_matches('/'),
                config.sending_domain
            ),
            api_key: config.api_key.clone(),
        }
    }

    /// The URL messages are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// The text fields of the form for `message`, in the order they are sent.
#[must_use]
pub fn form_fields(message: &OutboundMessage) -> Vec<(String, String)> {
    let mut fields = vec![("from".to_string(), message.from.clone())];
    fields.extend(message.to.iter().map(|to| ("to".to_string(), to.clone())));
    fields.extend(message.bcc.iter().map(|bcc| ("bcc".to_string(), bcc.clone())));
    fields.push(("subject".to_string(), message.subject.clone()));
    if let Some(text) = &message.text {
        fields.push(("text".to_string(), text.clone()));
    }
    if let Some(html) = &message.html {
        fields.push(("html".to_string(), html.clone()));
    }
    fields.extend(
        message
            .headers
            .iter()
            .map(|(name, value)| (format!("h:{name}"), value.clone())),
    );
    fields
}

fn build_form(message: &OutboundMessage) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in form_fields(message) {
        form = form.text(name, value);
    }
    for attachment in &message.attachments {
        let mut part = Part::bytes(attachment.data.clone()).file_name(attachment.filename.clone());
        if let Some(content_type) = &attachment.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part(attachment.disposition.field_name(), part);
    }
    Ok(form)
}

#[async_trait]
impl Mailer for MailgunMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<MailReceipt> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::Config {
                message: "MAILGUN_API_KEY is not set".to_string(),
            });
        };

        debug!(
            "Sending \"{}\" from {} to {} recipient(s), {} bcc",
            message.subject,
            message.from,
            message.to.len(),
            message.bcc.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(api_key))
            .multipart(build_form(message)?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mail API returned {}: {}", status, body);
            return Err(Error::MailRejected {
                status: status.as_u16(),
                body,
            });
        }

        let receipt = response.json::<MailReceipt>().await?;
        debug!("Mail API accepted message {:?}", receipt.id);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::{Attachment, Disposition};

    fn message() -> OutboundMessage {
        OutboundMessage {
            from: "Alice <alice@example.org>".to_string(),
            to: vec!["current@redvic.lists.example.org".to_string()],
            bcc: vec!["bob@example.org".to_string(), "carol@example.org".to_string()],
            subject: "Dinner".to_string(),
            text: Some("Who is cooking?".to_string()),
            html: None,
            headers: vec![
                ("List-Id".to_string(), "current@redvic.lists.example.org".to_string()),
                ("Precedence".to_string(), "list".to_string()),
            ],
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_form_fields() {
        let fields = form_fields(&message());
        let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            vec!["from", "to", "bcc", "bcc", "subject", "text", "h:List-Id", "h:Precedence"]
        );
        assert_eq!(fields[3].1, "carol@example.org");
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = MailConfig {
            api_base_url: "https://api.mailgun.net/v3/".to_string(),
            sending_domain: "mg.example.org".to_string(),
            ..Default::default()
        };
        assert_eq!(
            MailgunMailer::new(&config).endpoint(),
            "https://api.mailgun.net/v3/mg.example.org/messages"
        );
    }

    #[test]
    fn test_build_form_accepts_attachments() {
        let mut message = message();
        message.attachments.push(Attachment {
            filename: "menu.txt".to_string(),
            content_type: Some("text/plain".to_string()),
            data: b"soup".to_vec(),
            disposition: Disposition::Attachment,
        });
        assert!(build_form(&message).is_ok());
    }

    #[tokio::test]
    async fn test_send_without_key_is_a_config_error() {
        let mailer = MailgunMailer::new(&MailConfig::default());
        let result = mailer.send(&message()).await;
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
