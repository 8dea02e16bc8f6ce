//! Command router: one invocation in, one acknowledgment and one reply out.
//!
//! Per-invocation lifecycle:
//!
//! ```text
//! Initial -> Acknowledged -> Dispatched -> Replied
//!                         \-> RejectedForArity
//!                         \-> Rejected
//! ```
//!
//! The acknowledgment is released before any parsing or cluster I/O so the
//! transport's own deadline never depends on query latency. Every error after
//! that point becomes exactly one chat reply.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::commands::{Command, CommandDescriptor, COMMAND_DESCRIPTORS};
use crate::contexts::ContextRegistry;
use crate::error::KubebotError;
use crate::query::ClusterQuery;
use crate::slack::SlackError;
use crate::table::{format_table, NODE_COLUMNS, POD_COLUMNS};

/// Callback id of the `/kubebot` menu.
pub const MENU_CALLBACK_ID: &str = "kubebot_options";

/// Where a reply should be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    /// Conversation the invocation came from.
    pub channel_id: String,
    /// Transport-specific follow-up URL, if any.
    pub response_url: Option<String>,
}

/// One inbound command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command_name: String,
    pub argument_tokens: Vec<String>,
    pub requester_id: String,
    pub reply_target: ReplyTarget,
}

/// A selectable menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
}

/// Interactive choice attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub callback_id: String,
    pub prompt: String,
    pub options: Vec<MenuOption>,
}

impl Menu {
    /// The `/kubebot` entry menu.
    #[must_use]
    pub fn kubebot() -> Self {
        Self {
            callback_id: MENU_CALLBACK_ID.to_string(),
            prompt: "Select an option:".to_string(),
            options: vec![
                MenuOption {
                    label: "Clusters".to_string(),
                    value: "context_list".to_string(),
                },
                MenuOption {
                    label: "Help".to_string(),
                    value: "help".to_string(),
                },
            ],
        }
    }
}

/// Text sent back to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            menu: None,
        }
    }

    #[must_use]
    pub fn with_menu(mut self, menu: Menu) -> Self {
        self.menu = Some(menu);
        self
    }
}

/// Delivers replies to the originating conversation.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, target: &ReplyTarget, reply: &Reply) -> Result<(), SlackError>;
}

/// One-shot acknowledgment handle. Consumed on use, so an invocation can be
/// acknowledged at most once.
#[derive(Debug)]
pub struct Acknowledger(Option<oneshot::Sender<()>>);

impl Acknowledger {
    /// Acknowledger plus the receiver the transport waits on.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(Some(tx)), rx)
    }

    /// Acknowledger nobody waits on.
    #[must_use]
    pub fn detached() -> Self {
        Self(None)
    }

    fn ack(mut self) {
        if let Some(tx) = self.0.take() {
            // Receiver gone means the transport already gave up on this request.
            let _ = tx.send(());
        }
    }
}

/// Lifecycle states of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Initial,
    Acknowledged,
    Dispatched,
    Replied,
    /// Known command with the wrong arguments or subcommand; usage hint sent.
    RejectedForArity,
    /// Command name or menu value this bot does not handle; usage hint sent.
    Rejected,
}

/// Outcome of dispatching a parsed or rejected invocation.
enum Dispatch {
    Replied(Reply),
    Rejected(Reply, InvocationState),
}

/// Maps invocations to handlers. Holds only injected, read-only services.
pub struct CommandRouter {
    registry: Arc<dyn ContextRegistry>,
    query: Arc<dyn ClusterQuery>,
    sink: Arc<dyn ReplySink>,
    descriptors: &'static [CommandDescriptor],
}

impl CommandRouter {
    #[must_use]
    pub fn new(
        registry: Arc<dyn ContextRegistry>,
        query: Arc<dyn ClusterQuery>,
        sink: Arc<dyn ReplySink>,
    ) -> Self {
        Self {
            registry,
            query,
            sink,
            descriptors: COMMAND_DESCRIPTORS,
        }
    }

    /// Replace the help table.
    #[must_use]
    pub fn with_descriptors(mut self, descriptors: &'static [CommandDescriptor]) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Run one invocation to its terminal state.
    ///
    /// Returns `Replied`, `RejectedForArity` or `Rejected`. A reply that the
    /// sink fails to deliver is logged; the invocation still terminates.
    pub async fn handle(&self, invocation: Invocation, ack: Acknowledger) -> InvocationState {
        let mut state = InvocationState::Initial;
        debug!(command = %invocation.command_name, ?state, "Invocation received");

        ack.ack();
        state = InvocationState::Acknowledged;
        debug!(command = %invocation.command_name, ?state, "Invocation acknowledged");

        let (reply, terminal) = match self.dispatch(&invocation).await {
            Dispatch::Replied(reply) => (reply, InvocationState::Replied),
            Dispatch::Rejected(reply, state) => (reply, state),
        };

        if let Err(e) = self.sink.send(&invocation.reply_target, &reply).await {
            error!(
                command = %invocation.command_name,
                channel = %invocation.reply_target.channel_id,
                error = %e,
                "Failed to deliver reply"
            );
        }

        state = terminal;
        info!(
            command = %invocation.command_name,
            requester = %invocation.requester_id,
            ?state,
            "Invocation finished"
        );
        state
    }

    async fn dispatch(&self, invocation: &Invocation) -> Dispatch {
        let user = &invocation.requester_id;

        let command = match Command::parse(&invocation.command_name, &invocation.argument_tokens)
        {
            Ok(command) => {
                debug!(?command, state = ?InvocationState::Dispatched, "Invocation parsed");
                command
            }
            Err(e) => {
                warn!(
                    command = %invocation.command_name,
                    tokens = ?invocation.argument_tokens,
                    error = %e,
                    "Rejected invocation"
                );
                let state = match e {
                    KubebotError::UnknownCommand(_) => InvocationState::Rejected,
                    _ => InvocationState::RejectedForArity,
                };
                return Dispatch::Rejected(
                    Reply::text(format!("Hi <@{user}>! {}", e.user_message())),
                    state,
                );
            }
        };

        match self.execute(user, &command).await {
            Ok(reply) => Dispatch::Replied(reply),
            Err(e) => {
                warn!(
                    command = %invocation.command_name,
                    error = %e,
                    "Command failed"
                );
                Dispatch::Replied(Reply::text(format!("Sorry, <@{user}>! {}", e.user_message())))
            }
        }
    }

    async fn execute(&self, user: &str, command: &Command) -> Result<Reply, KubebotError> {
        match command {
            Command::Menu => Ok(Reply::text(format!(
                "Hi <@{user}>! What can I help you with?"
            ))
            .with_menu(Menu::kubebot())),

            Command::Help => Ok(Reply::text(format!(
                "Sure, <@{user}>! {}",
                self.help_text()
            ))),

            Command::ListContexts => {
                let contexts = self.registry.list_contexts().await?;
                let mut text = format!("Sure, <@{user}>! Listing context \n");
                for context in &contexts {
                    let _ = writeln!(text, "`{}`", context.name);
                }
                Ok(Reply::text(text))
            }

            Command::NodeCount { context } => {
                let nodes = self.query.list_nodes(context).await?;
                Ok(Reply::text(format!(
                    "Sure, <@{user}>! Counting Node in context `{context}` \nNode Count: {}.",
                    nodes.len()
                )))
            }

            Command::NodeList { context } => {
                let nodes = self.query.list_nodes(context).await?;
                Ok(Reply::text(format!(
                    "Hi <@{user}>! nodes in context list `{context}`:\n{}",
                    format_table(&NODE_COLUMNS, &nodes)
                )))
            }

            Command::PodList { namespace, context } => {
                let pods = self.query.list_pods(namespace, context).await?;
                Ok(Reply::text(format!(
                    "Hi <@{user}>! Pods in namespace `{namespace}` and context `{context}`:\n{}",
                    format_table(&POD_COLUMNS, &pods)
                )))
            }
        }
    }

    fn help_text(&self) -> String {
        let mut text = String::from("Here are the available commands and their descriptions:\n");
        for descriptor in self.descriptors {
            let _ = writeln!(text, "`{}`: {}", descriptor.name, descriptor.description);
        }
        text
    }
}
