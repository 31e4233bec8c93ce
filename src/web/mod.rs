//! HTTP interface: routes, middleware and the server loop.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod inbound;
pub mod jobs;
pub mod locations;
pub mod occupancy;

use crate::{context::AppContext, errors::Result};
use axum::{
    Router,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

/// Builds the application router.
pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/accounts", get(accounts::list).post(accounts::transfer))
        .route("/accounts/:id", get(accounts::detail))
        .route("/graph/my-occupancies", get(occupancy::my_occupancies))
        .route("/graph/my-current-occupancies", get(occupancy::my_current_occupancies))
        .route("/mail/:slug/current", post(inbound::current))
        .route("/mail/:slug/residents", post(inbound::residents))
        .route("/mail/:slug/stay", post(inbound::stay))
        .route("/mail/:slug/test", post(inbound::test))
        .route("/mail/:slug/announce", post(inbound::announce))
        .route("/mail/:slug/unsubscribe", post(inbound::unsubscribe))
        .route("/locations/:slug/events", post(locations::create_event))
        .route("/locations/:slug/events/pending", get(locations::pending_events))
        .route("/locations/:slug/events/:id/email", get(locations::event_email))
        .route("/locations/:slug/stays", post(locations::request_stay))
        .route("/locations/:slug/stays/:id", patch(locations::change_stay))
        .route("/locations/:slug/today", get(locations::today))
        .route("/jobs/:job", post(jobs::run))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Serves the router on the configured address until Ctrl-C.
pub async fn serve(ctx: AppContext) -> Result<()> {
    let address = ctx.config.server.bind_address.clone();
    let listener = TcpListener::bind(&address).await?;
    info!("Listening on {}", address);
    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
