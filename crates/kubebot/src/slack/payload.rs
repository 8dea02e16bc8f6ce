//! Slack request payloads and their mapping to router invocations.

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

use crate::commands::tokenize;
use crate::router::{Invocation, ReplyTarget, MENU_CALLBACK_ID};

/// Errors raised while decoding an inbound Slack request.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Required form field absent
    #[error("Missing form field: {0}")]
    MissingField(&'static str),

    /// Interaction payload was not valid JSON
    #[error("Invalid interaction payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Interaction carried no actions
    #[error("Interaction has no actions")]
    NoAction,
}

fn decode_form(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

fn take(form: &mut HashMap<String, String>, field: &'static str) -> Result<String, PayloadError> {
    form.remove(field).ok_or(PayloadError::MissingField(field))
}

/// A slash command request (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    pub command: String,
    pub text: String,
    pub user_id: String,
    pub channel_id: String,
    pub response_url: Option<String>,
}

impl SlashCommand {
    /// Decode from the raw form body.
    pub fn from_form(body: &[u8]) -> Result<Self, PayloadError> {
        let mut form = decode_form(body);
        Ok(Self {
            command: take(&mut form, "command")?,
            text: form.remove("text").unwrap_or_default(),
            user_id: take(&mut form, "user_id")?,
            channel_id: take(&mut form, "channel_id")?,
            response_url: form.remove("response_url").filter(|s| !s.is_empty()),
        })
    }

    #[must_use]
    pub fn into_invocation(self) -> Invocation {
        Invocation {
            argument_tokens: tokenize(&self.text),
            command_name: self.command,
            requester_id: self.user_id,
            reply_target: ReplyTarget {
                channel_id: self.channel_id,
                response_url: self.response_url,
            },
        }
    }
}

/// Identifier object (`{"id": "..."}`) used for users and channels.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SlackRef {
    pub id: String,
}

/// One clicked button in an interactive message.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InteractionAction {
    #[serde(default)]
    pub name: Option<String>,
    pub value: String,
}

/// Interactive message callback, sent as the JSON `payload` form field.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InteractionPayload {
    #[serde(default)]
    pub callback_id: Option<String>,
    pub actions: Vec<InteractionAction>,
    pub user: SlackRef,
    pub channel: SlackRef,
    #[serde(default)]
    pub response_url: Option<String>,
}

impl InteractionPayload {
    /// Decode from the raw form body.
    pub fn from_form(body: &[u8]) -> Result<Self, PayloadError> {
        let mut form = decode_form(body);
        let payload = take(&mut form, "payload")?;
        Ok(serde_json::from_str(&payload)?)
    }

    /// Map the first action to an invocation.
    ///
    /// Menu values become command names (`context_list`, `help`); values the
    /// router does not recognize still produce a usage reply downstream.
    pub fn into_invocation(self) -> Result<Invocation, PayloadError> {
        let action = self.actions.into_iter().next().ok_or(PayloadError::NoAction)?;

        let command_name = match self.callback_id.as_deref() {
            Some(MENU_CALLBACK_ID) | None => action.value,
            Some(other) => other.to_string(),
        };

        Ok(Invocation {
            command_name,
            argument_tokens: Vec::new(),
            requester_id: self.user.id,
            reply_target: ReplyTarget {
                channel_id: self.channel.id,
                response_url: self.response_url,
            },
        })
    }
}
