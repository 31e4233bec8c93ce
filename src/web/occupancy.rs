//! JSON routes over the occupancy resolvers.

use super::{auth::CurrentUser, error::AppResult};
use crate::{
    context::AppContext,
    graph::{OccupancyFilter, OccupantNode, occupants},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

/// `GET /graph/my-occupancies?arrive=YYYY-MM-DD&location=ID`
pub async fn my_occupancies(
    State(ctx): State<AppContext>,
    user: CurrentUser,
    Query(filter): Query<OccupancyFilter>,
) -> AppResult<Json<Vec<OccupantNode>>> {
    let found = occupants::my_occupancies(&ctx.db, user.user(), &filter).await?;
    let nodes = occupants::resolve_nodes(&ctx.db, found, Utc::now(), &ctx.config.site.time_zone).await?;
    Ok(Json(nodes))
}

/// `GET /graph/my-current-occupancies`
pub async fn my_current_occupancies(
    State(ctx): State<AppContext>,
    user: CurrentUser,
) -> AppResult<Json<Vec<OccupantNode>>> {
    let now = Utc::now();
    let tz = ctx.config.site.time_zone;
    let today = occupants::occupancy_today(now, &tz);
    let found = occupants::my_current_occupancies(&ctx.db, user.user(), today).await?;
    Ok(Json(occupants::resolve_nodes(&ctx.db, found, now, &tz).await?))
}
