//! Webhook server — the chat adapter posts messages here and relays replies
//!
//! - `POST /api/messages` takes an [`IncomingMessage`], answers with a
//!   [`Reply`](crate::report::Reply) or `204 No Content` when ignored
//! - `GET /api/commands` lists registered commands
//! - `GET /api/health` liveness probe

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use fwbot_firewall::Bus;

use crate::app::App;
use crate::gate::IncomingMessage;
use crate::registry::CommandDefinition;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub commands: usize,
}

pub fn router<B: Bus + 'static>(app: Arc<App<B>>) -> Router {
    Router::new()
        .route("/api/messages", post(post_message::<B>))
        .route("/api/commands", get(list_commands::<B>))
        .route("/api/health", get(health_check::<B>))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

/// Bind `listen_addr` and serve until the process exits.
pub async fn serve<B: Bus + 'static>(app: Arc<App<B>>, listen_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    info!("Webhook listening on http://{listen_addr}");

    axum::serve(listener, router(app))
        .await
        .context("Webhook server stopped")?;
    Ok(())
}

pub async fn post_message<B: Bus>(
    State(app): State<Arc<App<B>>>,
    Json(message): Json<IncomingMessage>,
) -> Response {
    match app.handle_message(&message).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn list_commands<B: Bus>(State(app): State<Arc<App<B>>>) -> Json<Vec<CommandDefinition>> {
    Json(app.registry().list_commands())
}

pub async fn health_check<B: Bus>(State(app): State<Arc<App<B>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        commands: app.registry().command_count(),
    })
}
