//! Slack Web API client used as the reply sink.
//!
//! Replies go through `chat.postMessage` when a bot token is configured.
//! Without one, the request's `response_url` is used instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::SlackError;
use crate::config::Config;
use crate::router::{Menu, Reply, ReplySink, ReplyTarget};

/// Posts replies with `chat.postMessage`.
#[derive(Clone)]
pub struct SlackClient {
    token: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl SlackClient {
    /// Create a client against a specific API base URL.
    #[must_use]
    pub fn with_base_url(token: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from service configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        if config.bot_token.is_none() {
            warn!("SLACK_BOT_TOKEN not set, replies fall back to response_url");
        }
        Self::with_base_url(config.bot_token.clone(), config.slack_api_base_url.clone())
    }

    /// Whether a bot token is configured.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.token.is_some()
    }

    /// Build the `chat.postMessage` body for a reply.
    fn format_payload<'a>(target: &'a ReplyTarget, reply: &'a Reply) -> PostMessage<'a> {
        PostMessage {
            channel: &target.channel_id,
            text: &reply.text,
            attachments: reply.menu.as_ref().map(|menu| vec![menu_attachment(menu)]),
        }
    }

    /// Post a reply to a slash command or interaction `response_url`.
    async fn post_response_url(
        &self,
        response_url: &str,
        reply: &Reply,
    ) -> Result<(), SlackError> {
        let payload = ResponseUrlMessage {
            response_type: "in_channel",
            text: &reply.text,
            attachments: reply.menu.as_ref().map(|menu| vec![menu_attachment(menu)]),
        };

        debug!("Posting reply to response_url");
        self.client
            .post(response_url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Render a menu as a legacy interactive attachment with one button per option.
fn menu_attachment(menu: &Menu) -> Attachment<'_> {
    Attachment {
        text: &menu.prompt,
        fallback: "You are unable to choose an option",
        callback_id: &menu.callback_id,
        attachment_type: "default",
        actions: menu
            .options
            .iter()
            .map(|option| AttachmentAction {
                name: "option",
                text: &option.label,
                action_type: "button",
                value: &option.value,
            })
            .collect(),
    }
}

#[async_trait]
impl ReplySink for SlackClient {
    async fn send(&self, target: &ReplyTarget, reply: &Reply) -> Result<(), SlackError> {
        let Some(token) = self.token.as_ref() else {
            return match target.response_url.as_deref() {
                Some(url) => self.post_response_url(url, reply).await,
                None => Err(SlackError::NotConfigured("SLACK_BOT_TOKEN".to_string())),
            };
        };

        let payload = Self::format_payload(target, reply);
        debug!(channel = %target.channel_id, "Posting reply");

        let response: ApiResponse = self
            .client
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.ok {
            debug!(channel = %target.channel_id, "Reply posted");
            Ok(())
        } else {
            let error = response.error.unwrap_or_else(|| "unknown_error".to_string());
            warn!(channel = %target.channel_id, error = %error, "chat.postMessage rejected");
            Err(SlackError::Api(error))
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<Attachment<'a>>>,
}

#[derive(Debug, Serialize)]
struct ResponseUrlMessage<'a> {
    response_type: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<Attachment<'a>>>,
}

#[derive(Debug, Serialize)]
struct Attachment<'a> {
    text: &'a str,
    fallback: &'a str,
    callback_id: &'a str,
    attachment_type: &'a str,
    actions: Vec<AttachmentAction<'a>>,
}

#[derive(Debug, Serialize)]
struct AttachmentAction<'a> {
    name: &'a str,
    text: &'a str,
    #[serde(rename = "type")]
    action_type: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}
