//! Scenario planning: network, node placement and probe command
//!
//! Everything here is decided before any pod exists, so unsupported entries
//! are skipped without touching the cluster.

use crate::parameters::{Connectivity, ConnectivityTestParameters, Protocol};
use crate::sriov::{EnabledNodes, SriovTemplate};

pub const SERVER_POD_IP: &str = "192.168.100.2";
pub const CLIENT_POD_IP: &str = "192.168.100.1";
pub const SERVER_POD_MAC: &str = "20:04:0f:f1:88:01";
pub const CLIENT_POD_MAC: &str = "20:04:0f:f1:88:03";

/// Echo requests sent by the client probe
pub const PING_COUNT: u32 = 5;

/// Why a matrix entry was not run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedProtocol(Protocol),
    UnsupportedConnectivity(Connectivity),
    NotEnoughNodes { required: usize, available: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedProtocol(p) => write!(f, "Unsupported test parameter {}", p),
            SkipReason::UnsupportedConnectivity(c) => {
                write!(f, "Unsupported test parameter {}", c)
            }
            SkipReason::NotEnoughNodes {
                required,
                available,
            } => write!(
                f,
                "Nodes number less than {} (found {})",
                required, available
            ),
        }
    }
}

/// Nodes hosting the server and client pods; equal for same-node topologies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSelection {
    pub server: String,
    pub client: String,
}

impl NodeSelection {
    pub fn is_same_node(&self) -> bool {
        self.server == self.client
    }
}

/// A fully resolved scenario, ready to be executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioPlan {
    pub params: ConnectivityTestParameters,
    pub network: &'static str,
    pub nodes: NodeSelection,
    pub client_command: Vec<String>,
}

/// Command run by the client pod; the pod succeeds iff the probe does
pub fn probe_command(
    params: &ConnectivityTestParameters,
    server_ip: &str,
) -> Result<Vec<String>, SkipReason> {
    match params.protocol {
        Protocol::Icmp => Ok(vec![
            "ping".to_string(),
            server_ip.to_string(),
            "-c".to_string(),
            PING_COUNT.to_string(),
            "-s".to_string(),
            params.mtu.probe_payload().to_string(),
            "-M".to_string(),
            "do".to_string(),
        ]),
        other => Err(SkipReason::UnsupportedProtocol(other)),
    }
}

/// Pick server and client nodes for a topology
pub fn select_nodes(
    connectivity: Connectivity,
    enabled: &EnabledNodes,
) -> Result<NodeSelection, SkipReason> {
    let required = match connectivity {
        Connectivity::DiffNode => 2,
        Connectivity::SameNodeSamePf => 1,
        other => return Err(SkipReason::UnsupportedConnectivity(other)),
    };

    if enabled.len() < required {
        return Err(SkipReason::NotEnoughNodes {
            required,
            available: enabled.len(),
        });
    }

    let server = enabled.nodes[0].clone();
    let client = enabled.nodes[required - 1].clone();
    Ok(NodeSelection { server, client })
}

/// Resolve network, nodes and command for one matrix entry
pub fn plan_scenario(
    params: &ConnectivityTestParameters,
    enabled: &EnabledNodes,
) -> Result<ScenarioPlan, SkipReason> {
    let network = SriovTemplate::for_mtu(params.mtu).network_name;
    let client_command = probe_command(params, SERVER_POD_IP)?;
    let nodes = select_nodes(params.connectivity, enabled)?;

    Ok(ScenarioPlan {
        params: *params,
        network,
        nodes,
        client_command,
    })
}
