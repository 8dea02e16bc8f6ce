//! Error types for context resolution, cluster queries and command parsing.

use thiserror::Error;

use crate::commands::CommandKind;

/// Result alias used across the crate.
pub type Result<T, E = KubebotError> = std::result::Result<T, E>;

/// Errors raised between an inbound invocation and its reply.
///
/// The router is the only place these become chat text; see
/// [`KubebotError::user_message`].
#[derive(Debug, Error)]
pub enum KubebotError {
    /// Kubeconfig could not be read or parsed
    #[error("Failed to load kubeconfig: {0}")]
    ConfigLoad(String),

    /// Named context is absent from the kubeconfig
    #[error("Context not found: {0}")]
    ContextNotFound(String),

    /// Namespace does not exist in the target cluster
    #[error("Namespace {namespace} not found in context {context}")]
    NamespaceNotFound { namespace: String, context: String },

    /// Cluster API call failed or timed out
    #[error("Cluster API unavailable for context {context}: {reason}")]
    ApiUnavailable { context: String, reason: String },

    /// Wrong number of argument tokens for a command
    #[error("{command} expects {expected} argument(s), got {actual}")]
    Arity {
        command: CommandKind,
        expected: usize,
        actual: usize,
    },

    /// Recognized command with an unrecognized subcommand
    #[error("{command} has no subcommand {subcommand:?}")]
    UnknownSubcommand {
        command: CommandKind,
        subcommand: String,
    },

    /// Command name not handled by this bot
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl KubebotError {
    /// Short, chat-safe description of the failure.
    ///
    /// Names the context or namespace where known and never includes the
    /// underlying cause.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ConfigLoad(_) => "I could not load the cluster configuration.".to_string(),
            Self::ContextNotFound(context) => {
                format!("context `{context}` was not found in the cluster configuration.")
            }
            Self::NamespaceNotFound { namespace, context } => {
                format!("namespace `{namespace}` was not found in context `{context}`.")
            }
            Self::ApiUnavailable { context, .. } => {
                format!("could not reach context `{context}`.")
            }
            Self::Arity { command, .. } | Self::UnknownSubcommand { command, .. } => {
                command.usage().to_string()
            }
            Self::UnknownCommand(name) => {
                format!("I don't know the command `{name}`. Try `/kubebot help`.")
            }
        }
    }

    /// Whether this error is a rejected invocation rather than a failed query.
    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::Arity { .. } | Self::UnknownSubcommand { .. } | Self::UnknownCommand(_)
        )
    }
}
