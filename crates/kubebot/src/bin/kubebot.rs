//! Kubebot service binary.
//!
//! Standalone HTTP service answering Slack slash commands with Kubernetes
//! node and pod snapshots.
//!
//! # Environment Variables
//!
//! - `SLACK_BOT_TOKEN` - Bot token used to post replies (required for replies)
//! - `SLACK_SIGNING_SECRET` - Signing secret for request verification
//! - `KUBEBOT_PORT` - Listen port (default 3000)
//! - `KUBECONFIG_PATH` - Explicit kubeconfig file

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubebot::{
    server, CommandRouter, Config, ContextRegistry, KubeClusterQuery, KubeconfigRegistry,
    SlackClient,
};

/// Slack slash-command relay for Kubernetes cluster queries.
#[derive(Parser)]
#[command(name = "kubebot")]
#[command(version)]
struct Cli {
    /// Listen port (or set `KUBEBOT_PORT`)
    #[arg(long, env = "KUBEBOT_PORT")]
    port: Option<u16>,

    /// Kubeconfig file (or set `KUBECONFIG_PATH`)
    #[arg(long, env = "KUBECONFIG_PATH")]
    kubeconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("kubebot=info".parse()?))
        .init();

    let cli = Cli::parse();

    info!("Starting kubebot...");

    // Load configuration
    let mut config = Config::default();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.kubeconfig.is_some() {
        config.kubeconfig_path = cli.kubeconfig;
    }

    if config.signing_secret.is_none() {
        warn!("SLACK_SIGNING_SECRET is not set. Requests will not be verified.");
    }

    let registry = KubeconfigRegistry::new(config.kubeconfig_path.clone());
    match registry.list_contexts().await {
        Ok(contexts) => info!(count = contexts.len(), "Kubeconfig contexts available"),
        // Not fatal: the file is re-read per invocation and may appear later.
        Err(e) => warn!(error = %e, "Kubeconfig not readable at startup"),
    }

    let query = KubeClusterQuery::new(registry.clone(), config.query_timeout);
    let slack = SlackClient::from_config(&config);

    let router = CommandRouter::new(Arc::new(registry), Arc::new(query), Arc::new(slack));

    // Build application state
    let state = server::AppState {
        config: config.clone(),
        router: Arc::new(router),
    };

    let app = server::build_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "Kubebot listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
