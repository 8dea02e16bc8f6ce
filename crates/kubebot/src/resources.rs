//! Read-only projections of nodes and pods used for display.

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Node, Pod};

use crate::table::TableRow;

/// Placeholder for absent fields.
pub const PLACEHOLDER: &str = "-";

/// Whole days between `created` and `now`, truncated toward zero.
///
/// Both instants are UTC, so offset changes on either side cannot skew the
/// result. Creation times in the future clamp to zero.
#[must_use]
pub fn age_in_days(created: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created).num_days().max(0)
}

/// Render an age as `"<days>d"`, or the placeholder when unknown.
#[must_use]
pub fn format_age(age_days: Option<i64>) -> String {
    age_days.map_or_else(|| PLACEHOLDER.to_string(), |days| format!("{days}d"))
}

fn or_placeholder(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

/// Snapshot of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub name: String,
    pub internal_ip: Option<String>,
    pub age_days: Option<i64>,
    pub kubelet_version: Option<String>,
}

impl NodeDescriptor {
    /// Project a node, computing its age relative to `now`.
    #[must_use]
    pub fn from_node(node: &Node, now: DateTime<Utc>) -> Self {
        let status = node.status.as_ref();

        let internal_ip = status
            .and_then(|s| s.addresses.as_ref())
            .and_then(|addresses| addresses.iter().find(|a| a.type_ == "InternalIP"))
            .map(|a| a.address.clone());

        let kubelet_version = status
            .and_then(|s| s.node_info.as_ref())
            .map(|info| info.kubelet_version.clone());

        Self {
            name: node.metadata.name.clone().unwrap_or_default(),
            internal_ip,
            age_days: node
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|t| age_in_days(t.0, now)),
            kubelet_version,
        }
    }
}

impl TableRow for NodeDescriptor {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_placeholder(self.internal_ip.as_deref()),
            format_age(self.age_days),
            or_placeholder(self.kubelet_version.as_deref()),
        ]
    }
}

/// Snapshot of one pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodDescriptor {
    pub name: String,
    pub phase: Option<String>,
    pub age_days: Option<i64>,
    pub pod_ip: Option<String>,
    pub node_name: Option<String>,
}

impl PodDescriptor {
    /// Project a pod, computing its age relative to `now`.
    #[must_use]
    pub fn from_pod(pod: &Pod, now: DateTime<Utc>) -> Self {
        let status = pod.status.as_ref();

        Self {
            name: pod.metadata.name.clone().unwrap_or_default(),
            phase: status.and_then(|s| s.phase.clone()),
            age_days: pod
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|t| age_in_days(t.0, now)),
            pod_ip: status.and_then(|s| s.pod_ip.clone()),
            node_name: pod.spec.as_ref().and_then(|s| s.node_name.clone()),
        }
    }
}

impl TableRow for PodDescriptor {
    fn cells(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            or_placeholder(self.phase.as_deref()),
            format_age(self.age_days),
            or_placeholder(self.pod_ip.as_deref()),
            or_placeholder(self.node_name.as_deref()),
        ]
    }
}
