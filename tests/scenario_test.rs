//! Tests for scenario planning
//!
//! These tests verify network resolution, node placement, skips and probe commands.

use sriov_conformance::parameters::{Connectivity, ConnectivityTestParameters, Mtu, Protocol};
use sriov_conformance::scenario::{
    connectivity_matrix, plan_scenario, probe_command, select_nodes, SkipReason, SERVER_POD_IP,
};
use sriov_conformance::sriov::EnabledNodes;

fn enabled(names: &[&str]) -> EnabledNodes {
    EnabledNodes {
        nodes: names.iter().map(|n| n.to_string()).collect(),
        ..Default::default()
    }
}

fn params(mtu: Mtu, connectivity: Connectivity, protocol: Protocol) -> ConnectivityTestParameters {
    ConnectivityTestParameters::from_parts(mtu, connectivity, protocol)
}

#[test]
fn test_custom_mtu_diff_node_icmp() {
    let plan = plan_scenario(
        &params(Mtu::Custom, Connectivity::DiffNode, Protocol::Icmp),
        &enabled(&["worker-0", "worker-1"]),
    )
    .unwrap();

    assert_eq!(
        plan.client_command,
        vec!["ping", "192.168.100.2", "-c", "5", "-s", "1400", "-M", "do"]
    );
    assert_eq!(plan.network, "test-sriov-static-custom");
    assert_eq!(plan.nodes.server, "worker-0");
    assert_eq!(plan.nodes.client, "worker-1");
    assert!(!plan.nodes.is_same_node());
}

#[test]
fn test_jumbo_probe_flags() {
    let command = probe_command(
        &params(Mtu::Jumbo, Connectivity::SameNodeSamePf, Protocol::Icmp),
        SERVER_POD_IP,
    )
    .unwrap();
    assert_eq!(command[command.len() - 4..], ["-s", "8972", "-M", "do"]);
}

#[test]
fn test_network_per_mtu_class() {
    let nodes = enabled(&["worker-0", "worker-1"]);
    for (mtu, network) in [
        (Mtu::Custom, "test-sriov-static-custom"),
        (Mtu::Standard, "test-sriov-static-usual"),
        (Mtu::Jumbo, "test-sriov-static-jumbo"),
    ] {
        let plan = plan_scenario(&params(mtu, Connectivity::DiffNode, Protocol::Icmp), &nodes)
            .unwrap();
        assert_eq!(plan.network, network);
    }
}

#[test]
fn test_diff_node_with_one_node_is_skipped() {
    let result = plan_scenario(
        &params(Mtu::Standard, Connectivity::DiffNode, Protocol::Icmp),
        &enabled(&["worker-0"]),
    );
    assert_eq!(
        result.unwrap_err(),
        SkipReason::NotEnoughNodes {
            required: 2,
            available: 1
        }
    );
}

#[test]
fn test_same_node_same_pf_with_one_node_runs_on_it() {
    let plan = plan_scenario(
        &params(Mtu::Standard, Connectivity::SameNodeSamePf, Protocol::Icmp),
        &enabled(&["worker-0"]),
    )
    .unwrap();
    assert_eq!(plan.nodes.server, "worker-0");
    assert_eq!(plan.nodes.client, "worker-0");
}

#[test]
fn test_same_node_same_pf_never_spreads_across_nodes() {
    let selection = select_nodes(
        Connectivity::SameNodeSamePf,
        &enabled(&["worker-0", "worker-1", "worker-2"]),
    )
    .unwrap();
    assert!(selection.is_same_node());
}

#[test]
fn test_unsupported_dimensions_are_skipped() {
    let nodes = enabled(&["worker-0", "worker-1"]);

    assert_eq!(
        plan_scenario(&params(Mtu::Standard, Connectivity::DiffNode, Protocol::Tcp), &nodes)
            .unwrap_err(),
        SkipReason::UnsupportedProtocol(Protocol::Tcp)
    );
    assert_eq!(
        plan_scenario(&params(Mtu::Standard, Connectivity::PodExternal, Protocol::Icmp), &nodes)
            .unwrap_err(),
        SkipReason::UnsupportedConnectivity(Connectivity::PodExternal)
    );
    assert_eq!(
        plan_scenario(
            &params(Mtu::Standard, Connectivity::SameNodeDiffPf, Protocol::Icmp),
            &nodes
        )
        .unwrap_err(),
        SkipReason::UnsupportedConnectivity(Connectivity::SameNodeDiffPf)
    );
}

#[test]
fn test_matrix_on_single_node_cluster() {
    let nodes = enabled(&["worker-0"]);
    let (planned, skipped): (Vec<_>, Vec<_>) = connectivity_matrix()
        .iter()
        .map(|p| plan_scenario(p, &nodes))
        .partition(Result::is_ok);

    assert_eq!(planned.len(), 3);
    assert_eq!(skipped.len(), 3);
}
