//! Scenario execution
//!
//! Creates the server and client pods for a planned scenario, waits for them
//! to reach the expected phases and always removes them afterwards.

use std::time::{Duration, Instant};

use k8s_openapi::api::core::v1::Pod;
use tracing::{error, info, instrument, warn};

use super::plan::*;
use crate::error::{SuiteError, SuiteResult};
use crate::k8s::{self, PodOperations, PodPhase, RestartPolicy};
use crate::parameters::ConnectivityTestParameters;
use crate::sriov::EnabledNodes;
use crate::stability::poll_until;

/// Result of one matrix entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    Passed,
    Skipped(SkipReason),
    Failed(String),
}

impl ScenarioOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ScenarioOutcome::Failed(_))
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub name: String,
    pub params: ConnectivityTestParameters,
    pub outcome: ScenarioOutcome,
    pub duration: Duration,
}

/// Bounds on the pod phase waits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PodWaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for PodWaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3 * 60),
            interval: Duration::from_secs(1),
        }
    }
}

/// Server pod: idles on the attachment so the client can reach it
pub fn server_pod(plan: &ScenarioPlan, namespace: &str, image: &str) -> SuiteResult<Pod> {
    let pod = k8s::define_with_node_networks(&plan.nodes.server, &[plan.network], namespace, image);
    let pod = k8s::redefine_with_static_network(pod, plan.network, SERVER_POD_MAC, SERVER_POD_IP)?;
    Ok(k8s::redefine_with_command(
        pod,
        vec!["sleep".to_string(), "3600".to_string()],
    ))
}

/// Client pod: runs the probe once and exits with its status
pub fn client_pod(plan: &ScenarioPlan, namespace: &str, image: &str) -> SuiteResult<Pod> {
    let pod = k8s::define_with_node_networks(&plan.nodes.client, &[plan.network], namespace, image);
    let pod = k8s::redefine_with_restart_policy(pod, RestartPolicy::Never);
    let pod = k8s::redefine_with_static_network(pod, plan.network, CLIENT_POD_MAC, CLIENT_POD_IP)?;
    Ok(k8s::redefine_with_command(pod, plan.client_command.clone()))
}

/// Runs matrix entries one at a time against the cluster
pub struct ScenarioRunner<'a, P> {
    pods: &'a P,
    enabled: &'a EnabledNodes,
    image: String,
    wait: PodWaitPolicy,
}

impl<'a, P: PodOperations> ScenarioRunner<'a, P> {
    pub fn new(pods: &'a P, enabled: &'a EnabledNodes, image: &str) -> Self {
        Self {
            pods,
            enabled,
            image: image.to_string(),
            wait: PodWaitPolicy::default(),
        }
    }

    pub fn with_wait_policy(mut self, wait: PodWaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Run one entry; never returns an error, failures are part of the result
    #[instrument(skip(self), fields(mtu = %params.mtu, connectivity = %params.connectivity, protocol = %params.protocol))]
    pub async fn run(&self, name: &str, params: &ConnectivityTestParameters) -> ScenarioResult {
        let started = Instant::now();

        let outcome = match plan_scenario(params, self.enabled) {
            Err(reason) => {
                warn!(%reason, "Skipping scenario");
                ScenarioOutcome::Skipped(reason)
            }
            Ok(plan) => {
                info!(command = ?plan.client_command, network = plan.network, "Running scenario");
                let mut created = Vec::new();
                let result = self.execute(&plan, &mut created).await;
                let cleanup = self.cleanup(&created).await;

                match (result, cleanup) {
                    (Ok(()), Ok(())) => ScenarioOutcome::Passed,
                    (Ok(()), Err(e)) => ScenarioOutcome::Failed(e.to_string()),
                    (Err(e), _) => ScenarioOutcome::Failed(e.to_string()),
                }
            }
        };

        match &outcome {
            ScenarioOutcome::Passed => info!("Scenario passed"),
            ScenarioOutcome::Failed(reason) => error!(%reason, "Scenario failed"),
            ScenarioOutcome::Skipped(_) => {}
        }

        ScenarioResult {
            name: name.to_string(),
            params: *params,
            outcome,
            duration: started.elapsed(),
        }
    }

    async fn execute(&self, plan: &ScenarioPlan, created: &mut Vec<String>) -> SuiteResult<()> {
        let namespace = self.pods.namespace();

        let server = self
            .pods
            .create_pod(&server_pod(plan, namespace, &self.image)?)
            .await?;
        let server_name = pod_name(&server)?;
        created.push(server_name.clone());
        self.wait_for_phase(&server_name, PodPhase::Running).await?;

        let client = self
            .pods
            .create_pod(&client_pod(plan, namespace, &self.image)?)
            .await?;
        let client_name = pod_name(&client)?;
        created.push(client_name.clone());
        self.wait_for_phase(&client_name, PodPhase::Succeeded).await
    }

    /// Poll the pod until it reaches `target`. A pod that ends in another
    /// terminal phase can never get there and fails the wait at once.
    async fn wait_for_phase(&self, name: &str, target: PodPhase) -> SuiteResult<()> {
        let pods = self.pods;
        let target = &target;
        poll_until(
            &format!("pod {} to be {}", name, target),
            self.wait.interval,
            self.wait.timeout,
            || async move {
                let phase = pods.pod_phase(name).await?;
                if phase == *target {
                    return Ok(Some(()));
                }
                if phase.is_terminal() {
                    return Err(SuiteError::PodFailed {
                        pod: name.to_string(),
                        phase: phase.to_string(),
                    });
                }
                Ok(None)
            },
        )
        .await
    }

    /// Delete every pod created by the scenario; the first error is returned
    /// after all deletions have been attempted
    async fn cleanup(&self, created: &[String]) -> SuiteResult<()> {
        let mut first_error = None;
        for name in created.iter().rev() {
            if let Err(e) = self.pods.delete_pod(name).await {
                error!(pod = %name, error = %e, "Failed to delete pod");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn pod_name(pod: &Pod) -> SuiteResult<String> {
    pod.metadata
        .name
        .clone()
        .ok_or_else(|| SuiteError::internal("created pod has no name"))
}
