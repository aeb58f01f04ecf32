//! SR-IOV operator module
//!
//! The operator is reached only through its custom resources:
//! - SriovNetworkNodePolicy (how many VFs, from which PFs, on which nodes)
//! - SriovNetwork (network attachment backed by a VF resource)
//! - SriovNetworkNodeState (per-node hardware inventory and sync status)

mod client;
mod discovery;
mod resources;
pub mod types;

pub use client::SriovClient;
pub use discovery::{
    all_nodes_stable, all_states_synced, discover_sriov, is_cluster_stable, sriov_stable,
    ClusterProbe, EnabledNodes,
};
pub use resources::{sriov_network, sriov_policy, SriovTemplate, TEMPLATES};
pub use types::{NodeState, SriovKind};
