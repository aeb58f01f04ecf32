//! SR-IOV operator resource types
//!
//! Only the fields the suite reads or writes are modelled. Objects travel
//! through the API as dynamic objects; these structs give the spec and status
//! payloads a typed shape.

use std::collections::BTreeMap;

use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde::{Deserialize, Serialize};

use crate::error::SuiteResult;

/// API group served by the SR-IOV network operator
pub const SRIOV_GROUP: &str = "sriovnetwork.openshift.io";
pub const SRIOV_VERSION: &str = "v1";

/// Sync status reported by a node's config daemon once it has applied its spec
pub const SYNC_STATUS_SUCCEEDED: &str = "Succeeded";

/// Custom resources owned by the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SriovKind {
    NodePolicy,
    Network,
    NodeState,
}

impl SriovKind {
    pub fn kind(self) -> &'static str {
        match self {
            SriovKind::NodePolicy => "SriovNetworkNodePolicy",
            SriovKind::Network => "SriovNetwork",
            SriovKind::NodeState => "SriovNetworkNodeState",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            SriovKind::NodePolicy => "sriovnetworknodepolicies",
            SriovKind::Network => "sriovnetworks",
            SriovKind::NodeState => "sriovnetworknodestates",
        }
    }

    pub fn api_resource(self) -> ApiResource {
        ApiResource {
            group: SRIOV_GROUP.to_string(),
            version: SRIOV_VERSION.to_string(),
            api_version: format!("{}/{}", SRIOV_GROUP, SRIOV_VERSION),
            kind: self.kind().to_string(),
            plural: self.plural().to_string(),
        }
    }
}

impl std::fmt::Display for SriovKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// Which physical functions a policy carves VFs from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicSelector {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pf_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SriovNetworkNodePolicySpec {
    pub node_selector: BTreeMap<String, String>,
    pub num_vfs: u32,
    pub resource_name: String,
    pub priority: u32,
    pub nic_selector: NicSelector,
    pub device_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SriovNetworkSpec {
    pub resource_name: String,
    /// IPAM plugin configuration, a JSON document in string form
    pub ipam: String,
    /// CNI capabilities, a JSON document in string form
    #[serde(default)]
    pub capabilities: String,
    pub network_namespace: String,
}

/// A physical NIC as reported by the config daemon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceStatus {
    pub name: String,
    #[serde(default)]
    pub pci_address: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub mtu: u32,
    #[serde(default)]
    pub num_vfs: u32,
    #[serde(rename = "totalvfs", default)]
    pub total_vfs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStateStatus {
    #[serde(default)]
    pub interfaces: Vec<InterfaceStatus>,
    #[serde(default)]
    pub sync_status: String,
    #[serde(default)]
    pub last_sync_error: String,
}

/// Per-node view of SR-IOV hardware and sync progress
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeState {
    pub name: String,
    pub status: NodeStateStatus,
}

impl NodeState {
    pub fn from_dynamic(obj: &DynamicObject) -> SuiteResult<Self> {
        let status = match obj.data.get("status") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())?,
            _ => NodeStateStatus::default(),
        };
        Ok(Self {
            name: obj.metadata.name.clone().unwrap_or_default(),
            status,
        })
    }

    /// The config daemon has applied the latest desired state
    pub fn is_synced(&self) -> bool {
        self.status.sync_status == SYNC_STATUS_SUCCEEDED
    }

    /// Interfaces able to expose virtual functions
    pub fn sriov_interfaces(&self) -> impl Iterator<Item = &InterfaceStatus> {
        self.status.interfaces.iter().filter(|i| i.total_vfs > 0)
    }
}
