//! Kubernetes integration module
//!
//! This module handles the cluster-facing side of the suite:
//! - Creating and deleting the workload namespace
//! - Building, creating and deleting test pods
//! - Listing nodes for discovery and stability checks

mod client;
mod resources;

pub use client::{K8sClient, PodOperations, PodPhase};
pub use resources::{
    define_with_node_networks, redefine_with_command, redefine_with_restart_policy,
    redefine_with_static_network, static_network_annotation, suite_labels, RestartPolicy,
    HOSTNAME_LABEL, NETWORKS_ANNOTATION,
};
