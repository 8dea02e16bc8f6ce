//! HTTP server for Slack slash commands and interactive actions.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::router::{Acknowledger, CommandRouter, Invocation};
use crate::slack::{
    validate_request_timestamp, verify_request_signature, InteractionPayload, SlashCommand,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Config,
    /// Command router shared by all invocations.
    pub router: Arc<CommandRouter>,
}

/// Build the HTTP router for the kubebot service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Slack endpoints
        .route("/slack/commands", post(slash_command_handler))
        .route("/slack/actions", post(interaction_handler))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if !state.config.can_reply() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}

/// Verify the Slack signature headers if a signing secret is configured.
fn verify_request(config: &Config, headers: &HeaderMap, body: &[u8]) -> Result<(), StatusCode> {
    let Some(secret) = &config.signing_secret else {
        debug!("No signing secret configured, skipping verification");
        return Ok(());
    };

    let timestamp = headers
        .get("x-slack-request-timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing X-Slack-Request-Timestamp header");
            StatusCode::UNAUTHORIZED
        })?;

    let signature = headers
        .get("x-slack-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing X-Slack-Signature header");
            StatusCode::UNAUTHORIZED
        })?;

    let Ok(timestamp_secs) = timestamp.parse::<i64>() else {
        warn!(timestamp = %timestamp, "Malformed request timestamp");
        return Err(StatusCode::UNAUTHORIZED);
    };

    if !validate_request_timestamp(
        timestamp_secs,
        config.max_timestamp_age_secs,
        chrono::Utc::now().timestamp(),
    ) {
        warn!(timestamp = timestamp_secs, "Stale request timestamp");
        return Err(StatusCode::UNAUTHORIZED);
    }

    if !verify_request_signature(body, timestamp, signature, secret) {
        warn!("Invalid request signature");
        return Err(StatusCode::UNAUTHORIZED);
    }

    debug!("Request signature verified");
    Ok(())
}

/// Run an invocation on its own task and return once it is acknowledged.
async fn acknowledge_and_spawn(
    router: Arc<CommandRouter>,
    invocation: Invocation,
) -> Result<StatusCode, StatusCode> {
    let (ack, ack_rx) = Acknowledger::channel();

    tokio::spawn(async move {
        router.handle(invocation, ack).await;
    });

    ack_rx.await.map_err(|_| {
        error!("Invocation task ended before acknowledging");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(StatusCode::OK)
}

/// Handle a slash command (`/kubebot`, `/node`, `/podlist`).
pub async fn slash_command_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    verify_request(&state.config, &headers, &body)?;

    let command = SlashCommand::from_form(&body).map_err(|e| {
        error!(error = %e, "Failed to parse slash command");
        StatusCode::BAD_REQUEST
    })?;

    info!(
        command = %command.command,
        user_id = %command.user_id,
        channel_id = %command.channel_id,
        "Received slash command"
    );

    acknowledge_and_spawn(state.router.clone(), command.into_invocation()).await
}

/// Handle an interactive message action (the `/kubebot` menu buttons).
pub async fn interaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    verify_request(&state.config, &headers, &body)?;

    let invocation = InteractionPayload::from_form(&body)
        .and_then(InteractionPayload::into_invocation)
        .map_err(|e| {
            error!(error = %e, "Failed to parse interaction payload");
            StatusCode::BAD_REQUEST
        })?;

    info!(
        action = %invocation.command_name,
        user_id = %invocation.requester_id,
        "Received menu action"
    );

    acknowledge_and_spawn(state.router.clone(), invocation).await
}
