//! Command surface: descriptor table and the parse step from raw tokens.

use std::fmt;

use crate::error::{KubebotError, Result};

/// Help-table entry for one surface command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Name as typed by the user.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Commands listed by `help`, in display order.
pub const COMMAND_DESCRIPTORS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "/kubebot",
        description: "Main command to interact with the Kubernetes bot.",
    },
    CommandDescriptor {
        name: "/node",
        description: "Command to get information about Kubernetes nodes. cmd - list, count",
    },
    CommandDescriptor {
        name: "/podlist",
        description: "List pods in a namespace of a context. Usage: `/podlist namespace context`",
    },
    CommandDescriptor {
        name: "help",
        description: "Display a list of available commands and their descriptions.",
    },
];

/// Top-level command an invocation is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `/kubebot` menu entry point
    Kubebot,
    /// `/node count|list <context>`
    Node,
    /// `/podlist <namespace> <context>`
    PodList,
    /// `help`
    Help,
    /// `contexts` (menu action `context_list`)
    Contexts,
}

impl CommandKind {
    /// Resolve a transport command name. A leading `/` is optional.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix('/').unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "kubebot" => Some(Self::Kubebot),
            "node" => Some(Self::Node),
            "podlist" => Some(Self::PodList),
            "help" => Some(Self::Help),
            "contexts" | "context_list" => Some(Self::Contexts),
            _ => None,
        }
    }

    /// Surface name, as shown in usage hints.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kubebot => "/kubebot",
            Self::Node => "/node",
            Self::PodList => "/podlist",
            Self::Help => "help",
            Self::Contexts => "contexts",
        }
    }

    /// Usage hint sent when an invocation of this command is rejected.
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Kubebot => {
                "What can I help you with? Options: `/kubebot`, `/kubebot help`, `/kubebot contexts`."
            }
            Self::Node => {
                "What can I help you with regarding nodes? Options: `/node count contextname`, `/node list contextname`."
            }
            Self::PodList => {
                "What can I help you with regarding pod list? Options: `/podlist namespace context`."
            }
            Self::Help => "`help` takes no arguments.",
            Self::Contexts => "`contexts` takes no arguments.",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed invocation, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Present the interactive menu.
    Menu,
    /// Render the command descriptor table.
    Help,
    /// List contexts from the registry.
    ListContexts,
    /// Count nodes in a context.
    NodeCount { context: String },
    /// Tabulate nodes in a context.
    NodeList { context: String },
    /// Tabulate pods in a namespace of a context.
    PodList { namespace: String, context: String },
}

impl Command {
    /// Parse a command name and its whitespace-delimited tokens.
    ///
    /// Every input maps to either a command or a usage error; there is no
    /// silent fallthrough.
    pub fn parse(name: &str, tokens: &[String]) -> Result<Self> {
        let kind = CommandKind::from_name(name)
            .ok_or_else(|| KubebotError::UnknownCommand(name.trim().to_string()))?;

        match kind {
            CommandKind::Kubebot => match tokens {
                [] => Ok(Self::Menu),
                [sub] if sub.eq_ignore_ascii_case("help") => Ok(Self::Help),
                [sub] if sub.eq_ignore_ascii_case("contexts") => Ok(Self::ListContexts),
                _ => Err(KubebotError::UnknownSubcommand {
                    command: kind,
                    subcommand: tokens.join(" "),
                }),
            },
            CommandKind::Help => {
                expect_arity(kind, tokens, 0)?;
                Ok(Self::Help)
            }
            CommandKind::Contexts => {
                expect_arity(kind, tokens, 0)?;
                Ok(Self::ListContexts)
            }
            CommandKind::Node => {
                expect_arity(kind, tokens, 2)?;
                let context = tokens[1].clone();
                match tokens[0].to_ascii_lowercase().as_str() {
                    "count" => Ok(Self::NodeCount { context }),
                    "list" => Ok(Self::NodeList { context }),
                    _ => Err(KubebotError::UnknownSubcommand {
                        command: kind,
                        subcommand: tokens[0].clone(),
                    }),
                }
            }
            CommandKind::PodList => {
                expect_arity(kind, tokens, 2)?;
                Ok(Self::PodList {
                    namespace: tokens[0].clone(),
                    context: tokens[1].clone(),
                })
            }
        }
    }
}

fn expect_arity(command: CommandKind, tokens: &[String], expected: usize) -> Result<()> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(KubebotError::Arity {
            command,
            expected,
            actual: tokens.len(),
        })
    }
}

/// Split raw command text into argument tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(String::from).collect()
}
