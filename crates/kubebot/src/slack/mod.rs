//! Slack transport: request verification, payload parsing and replies.

pub mod client;
pub mod payload;
pub mod signature;

use thiserror::Error;

pub use client::SlackClient;
pub use payload::{InteractionPayload, PayloadError, SlashCommand};
pub use signature::{sign_request, validate_request_timestamp, verify_request_signature};

/// Errors that can occur when delivering a reply to Slack.
#[derive(Debug, Error)]
pub enum SlackError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Client is not configured
    #[error("Slack not configured: {0}")]
    NotConfigured(String),

    /// Web API answered with `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),
}
