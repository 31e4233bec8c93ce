//! Lets the external scheduler trigger periodic jobs over HTTP.

use super::{
    auth::{CurrentUser, denied},
    error::AppResult,
};
use crate::{
    context::AppContext,
    core::access,
    jobs::{self, Job},
};
use axum::{
    Json,
    extract::{Path, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

/// Group allowed to trigger jobs.
pub const SCHEDULER_GROUP: &str = "scheduler";

/// `POST /jobs/:job`
pub async fn run(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    uri: Uri,
    Path(name): Path<String>,
) -> AppResult<Response> {
    let access = access::group_required(&ctx.db, user.user(), &[SCHEDULER_GROUP]).await?;
    if let Some(redirect) = denied(access, &uri, &ctx.config.server.login_url) {
        return Ok(redirect);
    }

    let job: Job = name.parse()?;
    let report = jobs::run_job(&ctx, job, Utc::now()).await?;
    Ok(Json(json!({ "job": job.name(), "sent": report.sent, "failed": report.failed })).into_response())
}
