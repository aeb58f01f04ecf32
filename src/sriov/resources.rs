//! SR-IOV policy and network builders
//!
//! Creates SriovNetworkNodePolicy and SriovNetwork manifests from the named
//! templates used by the connectivity scenarios.

use serde_json::json;

use super::types::*;
use crate::error::SuiteResult;
use crate::parameters::Mtu;

/// VFs requested from each selected PF
pub const NUM_VFS: u32 = 5;

/// Priority given to suite policies
pub const POLICY_PRIORITY: u32 = 99;

pub const DEVICE_TYPE_NETDEVICE: &str = "netdevice";

pub const STATIC_IPAM: &str = r#"{ "type": "static" }"#;

pub const MAC_IPS_CAPABILITIES: &str = r#"{ "mac": true, "ips": true }"#;

/// Policy the operator installs itself; never removed by the suite
pub const DEFAULT_POLICY_NAME: &str = "default";

/// One policy/network pair dedicated to an MTU class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SriovTemplate {
    pub mtu: Mtu,
    pub policy_name: &'static str,
    pub vf_range: &'static str,
    pub resource_name: &'static str,
    pub network_name: &'static str,
    /// MTU written into the policy; `None` leaves the PF default
    pub policy_mtu: Option<u32>,
}

pub const TEMPLATES: [SriovTemplate; 3] = [
    SriovTemplate {
        mtu: Mtu::Standard,
        policy_name: "test-policy-usual",
        vf_range: "#0-1",
        resource_name: "testresourceusual",
        network_name: "test-sriov-static-usual",
        policy_mtu: None,
    },
    SriovTemplate {
        mtu: Mtu::Custom,
        policy_name: "test-policy-custom",
        vf_range: "#2-3",
        resource_name: "testresourcecustom",
        network_name: "test-sriov-static-custom",
        policy_mtu: Some(Mtu::Custom.value()),
    },
    SriovTemplate {
        mtu: Mtu::Jumbo,
        policy_name: "test-policy-jumbo",
        vf_range: "#4-4",
        resource_name: "testresourcejumbo",
        network_name: "test-sriov-static-jumbo",
        policy_mtu: Some(Mtu::Jumbo.value()),
    },
];

impl SriovTemplate {
    /// Template backing an MTU class
    pub fn for_mtu(mtu: Mtu) -> &'static SriovTemplate {
        match mtu {
            Mtu::Standard => &TEMPLATES[0],
            Mtu::Custom => &TEMPLATES[1],
            Mtu::Jumbo => &TEMPLATES[2],
        }
    }
}

/// Create a SriovNetworkNodePolicy manifest.
///
/// The name is used as `generateName`, so repeated runs never collide with
/// policies still being torn down.
pub fn sriov_policy(
    name: &str,
    namespace: &str,
    node_label: &str,
    pf_name: &str,
    vf_range: &str,
    resource_name: &str,
    mtu: Option<u32>,
) -> SuiteResult<serde_json::Value> {
    let spec = SriovNetworkNodePolicySpec {
        node_selector: [(node_label.to_string(), String::new())].into_iter().collect(),
        num_vfs: NUM_VFS,
        resource_name: resource_name.to_string(),
        priority: POLICY_PRIORITY,
        nic_selector: NicSelector {
            pf_names: vec![format!("{}{}", pf_name, vf_range)],
        },
        device_type: DEVICE_TYPE_NETDEVICE.to_string(),
        mtu,
    };

    Ok(json!({
        "apiVersion": format!("{}/{}", SRIOV_GROUP, SRIOV_VERSION),
        "kind": SriovKind::NodePolicy.kind(),
        "metadata": {
            "generateName": name,
            "namespace": namespace,
        },
        "spec": serde_json::to_value(spec)?,
    }))
}

/// Create a SriovNetwork manifest rendering a static-IPAM attachment into
/// `target_namespace`
pub fn sriov_network(
    name: &str,
    namespace: &str,
    resource_name: &str,
    target_namespace: &str,
) -> SuiteResult<serde_json::Value> {
    let spec = SriovNetworkSpec {
        resource_name: resource_name.to_string(),
        ipam: STATIC_IPAM.to_string(),
        capabilities: MAC_IPS_CAPABILITIES.to_string(),
        network_namespace: target_namespace.to_string(),
    };

    Ok(json!({
        "apiVersion": format!("{}/{}", SRIOV_GROUP, SRIOV_VERSION),
        "kind": SriovKind::Network.kind(),
        "metadata": {
            "name": name,
            "namespace": namespace,
        },
        "spec": serde_json::to_value(spec)?,
    }))
}

impl SriovTemplate {
    pub fn policy_manifest(
        &self,
        namespace: &str,
        node_label: &str,
        pf_name: &str,
    ) -> SuiteResult<serde_json::Value> {
        sriov_policy(
            self.policy_name,
            namespace,
            node_label,
            pf_name,
            self.vf_range,
            self.resource_name,
            self.policy_mtu,
        )
    }

    pub fn network_manifest(
        &self,
        namespace: &str,
        target_namespace: &str,
    ) -> SuiteResult<serde_json::Value> {
        sriov_network(self.network_name, namespace, self.resource_name, target_namespace)
    }
}
