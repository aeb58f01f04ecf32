//! Pod builders for SR-IOV workloads

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;

use crate::error::SuiteResult;

/// Multus annotation requesting additional network attachments
pub const NETWORKS_ANNOTATION: &str = "k8s.v1.cni.cncf.io/networks";

/// Node label holding the node's hostname
pub const HOSTNAME_LABEL: &str = "kubernetes.io/hostname";

/// Restart policies accepted by [`redefine_with_restart_policy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
}

impl RestartPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            RestartPolicy::Always => "Always",
            RestartPolicy::OnFailure => "OnFailure",
            RestartPolicy::Never => "Never",
        }
    }
}

/// Labels attached to every pod the suite creates
pub fn suite_labels() -> BTreeMap<String, String> {
    [(
        "app.kubernetes.io/managed-by".to_string(),
        "sriov-conformance".to_string(),
    )]
    .into_iter()
    .collect()
}

/// A sleeping test pod pinned to `node` and attached to `networks`
pub fn define_with_node_networks(
    node: &str,
    networks: &[&str],
    namespace: &str,
    image: &str,
) -> Pod {
    Pod {
        metadata: ObjectMeta {
            generate_name: Some("testpod-".to_string()),
            namespace: Some(namespace.to_string()),
            labels: Some(suite_labels()),
            annotations: Some(
                [(NETWORKS_ANNOTATION.to_string(), networks.join(","))]
                    .into_iter()
                    .collect(),
            ),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "test".to_string(),
                image: Some(image.to_string()),
                command: Some(vec![
                    "/bin/bash".to_string(),
                    "-c".to_string(),
                    "sleep INF".to_string(),
                ]),
                ..Default::default()
            }],
            node_selector: Some(
                [(HOSTNAME_LABEL.to_string(), node.to_string())]
                    .into_iter()
                    .collect(),
            ),
            termination_grace_period_seconds: Some(0),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Same pod with a different restart policy
pub fn redefine_with_restart_policy(mut pod: Pod, policy: RestartPolicy) -> Pod {
    if let Some(spec) = pod.spec.as_mut() {
        spec.restart_policy = Some(policy.as_str().to_string());
    }
    pod
}

/// Replace the command of the pod's first container
pub fn redefine_with_command(mut pod: Pod, command: Vec<String>) -> Pod {
    if let Some(container) = pod.spec.as_mut().and_then(|s| s.containers.first_mut()) {
        container.command = Some(command);
    }
    pod
}

#[derive(Debug, Serialize)]
struct StaticAttachment<'a> {
    name: &'a str,
    mac: &'a str,
    ips: Vec<String>,
}

/// Network selection element with a fixed MAC and a /24 address
pub fn static_network_annotation(network: &str, mac: &str, ip: &str) -> SuiteResult<String> {
    let attachment = [StaticAttachment {
        name: network,
        mac,
        ips: vec![format!("{}/24", ip)],
    }];
    Ok(serde_json::to_string(&attachment)?)
}

/// Replace the pod's network annotation with a static attachment
pub fn redefine_with_static_network(
    mut pod: Pod,
    network: &str,
    mac: &str,
    ip: &str,
) -> SuiteResult<Pod> {
    let annotation = static_network_annotation(network, mac, ip)?;
    pod.metadata
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(NETWORKS_ANNOTATION.to_string(), annotation);
    Ok(pod)
}
