//! Connectivity scenarios
//!
//! Each matrix entry places a server and a client pod on SR-IOV VFs and
//! checks that an MTU-sized ICMP probe gets through without fragmentation.

mod matrix;
mod plan;
mod runner;

pub use matrix::{connectivity_matrix, TABLE_TITLE};
pub use plan::{
    plan_scenario, probe_command, select_nodes, NodeSelection, ScenarioPlan, SkipReason,
    CLIENT_POD_IP, CLIENT_POD_MAC, PING_COUNT, SERVER_POD_IP, SERVER_POD_MAC,
};
pub use runner::{
    client_pod, server_pod, PodWaitPolicy, ScenarioOutcome, ScenarioResult, ScenarioRunner,
};
