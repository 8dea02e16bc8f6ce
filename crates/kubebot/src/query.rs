//! Snapshot queries against the cluster API.

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::api::{Api, ListParams};
use kube::Client;
use tracing::{debug, info};

use crate::contexts::KubeconfigRegistry;
use crate::error::{KubebotError, Result};
use crate::resources::{NodeDescriptor, PodDescriptor};

/// Read-only node and pod listing for a named context.
#[async_trait]
pub trait ClusterQuery: Send + Sync {
    /// All nodes in the context's cluster.
    async fn list_nodes(&self, context: &str) -> Result<Vec<NodeDescriptor>>;

    /// All pods in `namespace` of the context's cluster.
    async fn list_pods(&self, namespace: &str, context: &str) -> Result<Vec<PodDescriptor>>;
}

/// kube-rs implementation. A fresh client is built per call from the
/// current kubeconfig.
pub struct KubeClusterQuery {
    registry: KubeconfigRegistry,
    timeout: Duration,
}

impl KubeClusterQuery {
    #[must_use]
    pub fn new(registry: KubeconfigRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    async fn client(&self, context: &str) -> Result<Client> {
        let config = self.registry.resolve(context).await?;
        Client::try_from(config).map_err(|e| unavailable(context, &e))
    }

    /// Run one API call under the configured timeout.
    async fn bounded<T, F>(&self, context: &str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| KubebotError::ApiUnavailable {
                context: context.to_string(),
                reason: format!("timed out after {:?}", self.timeout),
            })?
    }
}

fn unavailable(context: &str, err: &kube::Error) -> KubebotError {
    KubebotError::ApiUnavailable {
        context: context.to_string(),
        reason: err.to_string(),
    }
}

/// Map a namespaced list failure; a 404 means the namespace is missing.
fn map_pod_list_error(namespace: &str, context: &str, err: &kube::Error) -> KubebotError {
    match err {
        kube::Error::Api(response) if response.code == 404 => KubebotError::NamespaceNotFound {
            namespace: namespace.to_string(),
            context: context.to_string(),
        },
        _ => unavailable(context, err),
    }
}

#[async_trait]
impl ClusterQuery for KubeClusterQuery {
    async fn list_nodes(&self, context: &str) -> Result<Vec<NodeDescriptor>> {
        let start = Instant::now();
        let client = self.client(context).await?;

        let list = self
            .bounded(context, async {
                let nodes: Api<Node> = Api::all(client);
                nodes
                    .list(&ListParams::default())
                    .await
                    .map_err(|e| unavailable(context, &e))
            })
            .await?;

        debug!(context = %context, elapsed = ?start.elapsed(), "list_nodes API call finished");

        let now = Utc::now();
        let nodes: Vec<NodeDescriptor> = list
            .items
            .iter()
            .map(|node| NodeDescriptor::from_node(node, now))
            .collect();

        info!(context = %context, count = nodes.len(), "Listed nodes");
        Ok(nodes)
    }

    async fn list_pods(&self, namespace: &str, context: &str) -> Result<Vec<PodDescriptor>> {
        let start = Instant::now();
        let client = self.client(context).await?;

        let list = self
            .bounded(context, async {
                let pods: Api<Pod> = Api::namespaced(client, namespace);
                pods.list(&ListParams::default())
                    .await
                    .map_err(|e| map_pod_list_error(namespace, context, &e))
            })
            .await?;

        debug!(
            context = %context,
            namespace = %namespace,
            elapsed = ?start.elapsed(),
            "list_pods API call finished"
        );

        let now = Utc::now();
        let pods: Vec<PodDescriptor> = list
            .items
            .iter()
            .map(|pod| PodDescriptor::from_pod(pod, now))
            .collect();

        info!(context = %context, namespace = %namespace, count = pods.len(), "Listed pods");
        Ok(pods)
    }
}
