//! Slack slash-command relay for read-only Kubernetes queries.
//!
//! This crate provides:
//! - Context registry backed by the local kubeconfig
//! - Node and pod snapshot queries through kube-rs
//! - Fixed-width table rendering for chat replies
//! - Command parsing and routing with exactly one reply per invocation
//! - Slack request signing, payload parsing and Web API replies
//! - HTTP server for slash commands and interactive menu actions

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Most async query and transport methods can fail

pub mod commands;
pub mod config;
pub mod contexts;
pub mod error;
pub mod query;
pub mod resources;
pub mod router;
pub mod server;
pub mod slack;
pub mod table;

pub use commands::{Command, CommandDescriptor, CommandKind, COMMAND_DESCRIPTORS};
pub use config::Config;
pub use contexts::{ContextRegistry, KubeContext, KubeconfigRegistry};
pub use error::{KubebotError, Result};
pub use query::{ClusterQuery, KubeClusterQuery};
pub use resources::{NodeDescriptor, PodDescriptor};
pub use router::{
    Acknowledger, CommandRouter, Invocation, InvocationState, Menu, MenuOption, Reply, ReplySink,
    ReplyTarget,
};
pub use slack::{SlackClient, SlackError};
pub use table::{format_table, Column, TableRow, NODE_COLUMNS, POD_COLUMNS};
