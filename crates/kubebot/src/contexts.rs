//! Context registry backed by the local kubeconfig.
//!
//! The kubeconfig is re-read on every call so edits made while the bot is
//! running are picked up by the next invocation. Reads run on the blocking
//! pool so a slow filesystem never stalls other invocations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use crate::error::{KubebotError, Result};

/// A context entry from the kubeconfig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubeContext {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
}

/// Source of known cluster contexts.
#[async_trait]
pub trait ContextRegistry: Send + Sync {
    /// All contexts, in the order the configuration lists them.
    async fn list_contexts(&self) -> Result<Vec<KubeContext>>;
}

/// Registry reading either an explicit kubeconfig file or the default
/// location (`KUBECONFIG`, then `~/.kube/config`).
#[derive(Debug, Clone, Default)]
pub struct KubeconfigRegistry {
    path: Option<PathBuf>,
}

impl KubeconfigRegistry {
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Explicit kubeconfig path, if one was configured.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn load(&self) -> Result<Kubeconfig> {
        let path = self.path.clone();
        let kubeconfig = tokio::task::spawn_blocking(move || match path {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        })
        .await
        .map_err(|e| KubebotError::ConfigLoad(e.to_string()))?
        .map_err(|e| KubebotError::ConfigLoad(e.to_string()))?;

        debug!(
            contexts = kubeconfig.contexts.len(),
            path = ?self.path,
            "Loaded kubeconfig"
        );
        Ok(kubeconfig)
    }

    /// Build client configuration for the named context.
    pub async fn resolve(&self, context_name: &str) -> Result<kube::Config> {
        let kubeconfig = self.load().await?;

        if !kubeconfig.contexts.iter().any(|c| c.name == context_name) {
            return Err(KubebotError::ContextNotFound(context_name.to_string()));
        }

        let options = KubeConfigOptions {
            context: Some(context_name.to_string()),
            ..Default::default()
        };

        kube::Config::from_custom_kubeconfig(kubeconfig, &options)
            .await
            .map_err(|e| KubebotError::ApiUnavailable {
                context: context_name.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ContextRegistry for KubeconfigRegistry {
    async fn list_contexts(&self) -> Result<Vec<KubeContext>> {
        let kubeconfig = self.load().await?;

        Ok(kubeconfig
            .contexts
            .into_iter()
            .filter_map(|named| {
                let ctx = named.context?;
                Some(KubeContext {
                    name: named.name,
                    cluster: ctx.cluster,
                    user: ctx.user.unwrap_or_default(),
                    namespace: ctx.namespace,
                })
            })
            .collect())
    }
}
