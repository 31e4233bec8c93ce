//! Who is making the request.
//!
//! Authentication happens upstream: the proxy sets a header naming the user.
//! A missing header, or one naming an unknown or inactive user, is anonymous.

use super::error::AppError;
use crate::{
    context::AppContext,
    core::access::Access,
    entities::{User, user},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{Uri, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use sea_orm::prelude::*;
use tracing::debug;

/// The signed-in user, if any.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<user::Model>);

impl CurrentUser {
    pub fn user(&self) -> Option<&user::Model> {
        self.0.as_ref()
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, ctx: &AppContext) -> Result<Self, Self::Rejection> {
        let username = parts
            .headers
            .get(ctx.config.server.user_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty());

        let Some(username) = username else {
            return Ok(Self(None));
        };

        let found = User::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::IsActive.eq(true))
            .one(&ctx.db)
            .await?;
        if found.is_none() {
            debug!("Unknown or inactive user in auth header: {}", username);
        }
        Ok(Self(found))
    }
}

/// Turns a denied access check into the matching redirect.
pub fn denied(access: Access, uri: &Uri, login_url: &str) -> Option<Response> {
    access
        .redirect_target(uri.path_and_query().map_or(uri.path(), |pq| pq.as_str()), login_url)
        .map(|target| Redirect::to(&target).into_response())
}
