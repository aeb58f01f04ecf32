//! SR-IOV capable node discovery and stability queries

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Node;
use tracing::{debug, info, instrument};

use super::client::SriovClient;
use super::types::NodeState;
use crate::error::{SuiteError, SuiteResult};
use crate::k8s::K8sClient;
use crate::stability::StabilityProbe;

/// Snapshot of nodes able to host SR-IOV workloads, taken once at setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnabledNodes {
    /// Node names, sorted
    pub nodes: Vec<String>,
    pub states: BTreeMap<String, NodeState>,
}

impl EnabledNodes {
    /// Keep nodes that are selected by the policy label and expose at least
    /// one VF-capable interface.
    ///
    /// A selected node whose state is still syncing makes the inventory
    /// unreliable and is an error, as is finding no enabled node at all.
    pub fn from_parts(selected: &[Node], states: &[NodeState]) -> SuiteResult<Self> {
        let selected: Vec<&str> = selected
            .iter()
            .filter_map(|n| n.metadata.name.as_deref())
            .collect();

        let candidates: Vec<&NodeState> = states
            .iter()
            .filter(|s| selected.contains(&s.name.as_str()))
            .collect();

        let unsynced: Vec<&str> = candidates
            .iter()
            .filter(|s| !s.is_synced())
            .map(|s| s.name.as_str())
            .collect();
        if !unsynced.is_empty() {
            return Err(SuiteError::Discovery(format!(
                "node states not synced: {}",
                unsynced.join(", ")
            )));
        }

        let states: BTreeMap<String, NodeState> = candidates
            .into_iter()
            .filter(|s| s.sriov_interfaces().next().is_some())
            .map(|s| (s.name.clone(), s.clone()))
            .collect();

        if states.is_empty() {
            return Err(SuiteError::Discovery(format!(
                "no SR-IOV enabled node among {} selected",
                selected.len()
            )));
        }

        Ok(Self {
            nodes: states.keys().cloned().collect(),
            states,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Find SR-IOV enabled nodes carrying `node_label`. Call once the operator
/// is stable; a node still syncing fails discovery.
#[instrument(skip(k8s, sriov))]
pub async fn discover_sriov(
    k8s: &K8sClient,
    sriov: &SriovClient,
    node_label: &str,
) -> SuiteResult<EnabledNodes> {
    let nodes = k8s.list_nodes(Some(node_label)).await?;
    let states = sriov.node_states().await?;
    let enabled = EnabledNodes::from_parts(&nodes, &states)?;

    info!(nodes = ?enabled.nodes, "Discovered SR-IOV enabled nodes");
    Ok(enabled)
}

/// Every config daemon has applied its desired state
pub fn all_states_synced(states: &[NodeState]) -> bool {
    states.iter().all(|state| {
        if !state.is_synced() {
            debug!(
                node = %state.name,
                status = %state.status.sync_status,
                "Node state not synced"
            );
            return false;
        }
        true
    })
}

/// Every node is schedulable and reports Ready
pub fn all_nodes_stable(nodes: &[Node]) -> bool {
    nodes.iter().all(|node| {
        let name = node.metadata.name.as_deref().unwrap_or("unknown");
        let unschedulable = node
            .spec
            .as_ref()
            .and_then(|s| s.unschedulable)
            .unwrap_or(false);
        if unschedulable {
            debug!(node = name, "Node is cordoned");
            return false;
        }

        let ready = node
            .status
            .as_ref()
            .and_then(|s| s.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Ready" && c.status == "True")
            })
            .unwrap_or(false);
        if !ready {
            debug!(node = name, "Node is not ready");
        }
        ready
    })
}

/// Has the operator finished reconciling every node?
pub async fn sriov_stable(sriov: &SriovClient) -> SuiteResult<bool> {
    let states = sriov.node_states().await?;
    Ok(all_states_synced(&states))
}

/// Are all cluster nodes back in service?
pub async fn is_cluster_stable(k8s: &K8sClient) -> SuiteResult<bool> {
    let nodes = k8s.list_nodes(None).await?;
    Ok(all_nodes_stable(&nodes))
}

/// Stability probe backed by the live cluster
pub struct ClusterProbe<'a> {
    pub k8s: &'a K8sClient,
    pub sriov: &'a SriovClient,
}

impl StabilityProbe for ClusterProbe<'_> {
    async fn operator_stable(&self) -> SuiteResult<bool> {
        sriov_stable(self.sriov).await
    }

    async fn cluster_stable(&self) -> SuiteResult<bool> {
        is_cluster_stable(self.k8s).await
    }
}
