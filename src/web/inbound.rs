//! Webhook endpoints the mail provider posts incoming list mail to.
//!
//! The provider retries anything that is not a 200, so every drop answers 200.

use super::error::AppResult;
use crate::{
    context::AppContext,
    errors::{Error, Result},
    mail::{
        Attachment, Disposition,
        inbound::{self, InboundMessage, InboundOutcome, ListKind},
    },
};
use axum::{
    Form, Json, async_trait,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::header::CONTENT_TYPE,
};
use chrono::Utc;
use serde_json::{Value, json};
use std::{collections::HashMap, convert::Infallible};
use tracing::debug;

/// The posted message, or why it could not be read.
///
/// Never rejects: an unreadable payload is dropped by the relay like any
/// other malformed message.
pub struct InboundPayload(pub Result<InboundMessage>);

fn malformed(message: impl ToString) -> Error {
    Error::MalformedMessage {
        message: message.to_string(),
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<InboundMessage> {
    let mut fields = HashMap::new();
    let mut attachments = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(ToString::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(ToString::to_string);
                let data = field.bytes().await.map_err(malformed)?;
                attachments.push(Attachment {
                    filename,
                    content_type,
                    data: data.to_vec(),
                    disposition: Disposition::Attachment,
                });
            }
            None => {
                let value = field.text().await.map_err(malformed)?;
                fields.insert(name, value);
            }
        }
    }
    InboundMessage::from_fields(&fields, attachments)
}

#[async_trait]
impl<S> FromRequest<S> for InboundPayload
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let message = if is_multipart {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => read_multipart(multipart).await,
                Err(rejection) => Err(malformed(rejection)),
            }
        } else {
            match Form::<HashMap<String, String>>::from_request(req, state).await {
                Ok(Form(fields)) => InboundMessage::from_fields(&fields, Vec::new()),
                Err(rejection) => Err(malformed(rejection)),
            }
        };
        Ok(Self(message))
    }
}

fn outcome_body(outcome: &InboundOutcome) -> Value {
    match outcome {
        InboundOutcome::Relayed(receipt) => json!({ "status": "relayed", "id": receipt.id }),
        InboundOutcome::Announced(count) => json!({ "status": "announced", "recipients": count }),
        InboundOutcome::Dropped(reason) => json!({ "status": "dropped", "reason": format!("{reason:?}") }),
        InboundOutcome::Ignored => json!({ "status": "ignored" }),
    }
}

async fn relay_list(ctx: &AppContext, slug: &str, kind: ListKind, payload: InboundPayload) -> AppResult<Json<Value>> {
    let outcome = inbound::relay(ctx, slug, kind, payload.0, Utc::now()).await?;
    debug!("{}@{}: {:?}", kind.local_part(), slug, outcome);
    Ok(Json(outcome_body(&outcome)))
}

/// `POST /mail/:slug/current`
pub async fn current(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    payload: InboundPayload,
) -> AppResult<Json<Value>> {
    relay_list(&ctx, &slug, ListKind::Current, payload).await
}

/// `POST /mail/:slug/residents`
pub async fn residents(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    payload: InboundPayload,
) -> AppResult<Json<Value>> {
    relay_list(&ctx, &slug, ListKind::Residents, payload).await
}

/// `POST /mail/:slug/stay`
pub async fn stay(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    payload: InboundPayload,
) -> AppResult<Json<Value>> {
    relay_list(&ctx, &slug, ListKind::Stay, payload).await
}

/// `POST /mail/:slug/test`
pub async fn test(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    payload: InboundPayload,
) -> AppResult<Json<Value>> {
    relay_list(&ctx, &slug, ListKind::Test, payload).await
}

/// `POST /mail/:slug/announce`
pub async fn announce(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    payload: InboundPayload,
) -> AppResult<Json<Value>> {
    let outcome = inbound::announce(&ctx, &slug, payload.0).await?;
    Ok(Json(outcome_body(&outcome)))
}

/// `POST /mail/:slug/unsubscribe`
pub async fn unsubscribe(State(ctx): State<AppContext>, Path(slug): Path<String>) -> AppResult<Json<Value>> {
    let outcome = inbound::unsubscribe(&ctx.db, &slug).await?;
    Ok(Json(outcome_body(&outcome)))
}
