//! Kubernetes client wrapper for the conformance suite

use std::path::Path;
use std::time::Duration;

use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    runtime::wait::{await_condition, conditions},
    Client, Config,
};
use tracing::{info, instrument, warn};

use crate::error::{SuiteError, SuiteResult};

/// Pod phase as reported in `status.phase`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => PodPhase::Pending,
            "Running" => PodPhase::Running,
            "Succeeded" => PodPhase::Succeeded,
            "Failed" => PodPhase::Failed,
            _ => PodPhase::Unknown,
        }
    }
}

impl PodPhase {
    pub fn of(pod: &Pod) -> Self {
        pod.status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Unknown)
    }

    /// Succeeded and Failed never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, PodPhase::Succeeded | PodPhase::Failed)
    }
}

impl std::fmt::Display for PodPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PodPhase::Pending => write!(f, "Pending"),
            PodPhase::Running => write!(f, "Running"),
            PodPhase::Succeeded => write!(f, "Succeeded"),
            PodPhase::Failed => write!(f, "Failed"),
            PodPhase::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Wrapper around kube::Client bound to the suite's workload namespace
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
    namespace: String,
}

impl K8sClient {
    /// Build a client from an explicit kubeconfig, or infer one from
    /// `KUBECONFIG` / in-cluster settings
    #[instrument(skip_all)]
    pub async fn new(kubeconfig: Option<&Path>, namespace: &str) -> SuiteResult<Self> {
        let config = match kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                    SuiteError::internal(&format!(
                        "Failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .map_err(|e| SuiteError::internal(&format!("Invalid kubeconfig: {}", e)))?
            }
            None => Config::infer().await.map_err(|e| {
                SuiteError::internal(&format!(
                    "Client is not set, check the KUBECONFIG env variable: {}",
                    e
                ))
            })?,
        };
        let client = Client::try_from(config)?;

        info!("Connected to Kubernetes cluster");

        Ok(Self::from_client(client, namespace))
    }

    /// Wrap an existing kube client
    pub fn from_client(client: Client, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    /// Get the namespace test pods run in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the inner kube Client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Check if cluster is reachable
    pub async fn health_check(&self) -> SuiteResult<()> {
        let version = self.client.apiserver_version().await?;
        info!(version = %version.git_version, "Kubernetes cluster is healthy");
        Ok(())
    }

    /// Get a typed API for pods in the workload namespace
    pub fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// Create the workload namespace, tolerating an existing one
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn create_namespace(&self) -> SuiteResult<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());

        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some(self.namespace.clone()),
                labels: Some(
                    [(
                        "app.kubernetes.io/managed-by".to_string(),
                        "sriov-conformance".to_string(),
                    )]
                    .into_iter()
                    .collect(),
                ),
                ..Default::default()
            },
            ..Default::default()
        };

        match namespaces.create(&PostParams::default(), &ns).await {
            Ok(_) => {
                info!("Created namespace");
            }
            Err(kube::Error::Api(e)) if e.code == 409 => {
                info!("Namespace already exists");
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Delete the workload namespace and block until it is gone
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn delete_namespace_and_wait(&self, timeout: Duration) -> SuiteResult<()> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());

        let uid = match namespaces.get(&self.namespace).await {
            Ok(ns) => ns.metadata.uid.unwrap_or_default(),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                info!("Namespace already absent");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        match namespaces
            .delete(&self.namespace, &DeleteParams::default())
            .await
        {
            Ok(_) => {}
            Err(kube::Error::Api(e)) if e.code == 404 => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        let gone = await_condition(namespaces, &self.namespace, conditions::is_deleted(&uid));
        match tokio::time::timeout(timeout, gone).await {
            Ok(Ok(_)) => {
                info!("Deleted namespace");
                Ok(())
            }
            Ok(Err(e)) => Err(SuiteError::internal(&format!(
                "Failed watching namespace deletion: {}",
                e
            ))),
            Err(_) => Err(SuiteError::timeout(
                &format!("namespace {} to be deleted", self.namespace),
                timeout,
            )),
        }
    }

    /// Create a pod
    #[instrument(skip(self, pod), fields(pod_name = %pod.metadata.name.as_deref().or(pod.metadata.generate_name.as_deref()).unwrap_or("unknown")))]
    pub async fn create_pod(&self, pod: &Pod) -> SuiteResult<Pod> {
        let created = self.pods().create(&PostParams::default(), pod).await?;
        info!(name = %created.metadata.name.as_deref().unwrap_or("unknown"), "Created pod");
        Ok(created)
    }

    /// Get a pod by name
    pub async fn get_pod(&self, name: &str) -> SuiteResult<Pod> {
        Ok(self.pods().get(name).await?)
    }

    /// Current phase of a pod
    pub async fn pod_phase(&self, name: &str) -> SuiteResult<PodPhase> {
        let pod = self.get_pod(name).await?;
        Ok(PodPhase::of(&pod))
    }

    /// Delete a pod immediately (grace period 0)
    #[instrument(skip(self))]
    pub async fn delete_pod(&self, name: &str) -> SuiteResult<()> {
        match self
            .pods()
            .delete(name, &DeleteParams::default().grace_period(0))
            .await
        {
            Ok(_) => {
                info!(name, "Deleted pod");
                Ok(())
            }
            Err(kube::Error::Api(e)) if e.code == 404 => {
                warn!(name, "Pod not found (already deleted?)");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List pods in the workload namespace
    pub async fn list_pods(&self) -> SuiteResult<Vec<Pod>> {
        Ok(self.pods().list(&ListParams::default()).await?.items)
    }

    /// List nodes, optionally filtered by a label selector
    pub async fn list_nodes(&self, label_selector: Option<&str>) -> SuiteResult<Vec<Node>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let mut params = ListParams::default();
        if let Some(selector) = label_selector {
            params = params.labels(selector);
        }
        Ok(nodes.list(&params).await?.items)
    }
}

/// Pod lifecycle calls a scenario needs from the cluster
#[allow(async_fn_in_trait)]
pub trait PodOperations {
    /// Namespace pods are created in
    fn namespace(&self) -> &str;

    /// Create a pod; the returned object carries the server-assigned name
    async fn create_pod(&self, pod: &Pod) -> SuiteResult<Pod>;

    async fn pod_phase(&self, name: &str) -> SuiteResult<PodPhase>;

    /// Delete immediately; a missing pod counts as deleted
    async fn delete_pod(&self, name: &str) -> SuiteResult<()>;
}

impl PodOperations for K8sClient {
    fn namespace(&self) -> &str {
        K8sClient::namespace(self)
    }

    async fn create_pod(&self, pod: &Pod) -> SuiteResult<Pod> {
        K8sClient::create_pod(self, pod).await
    }

    async fn pod_phase(&self, name: &str) -> SuiteResult<PodPhase> {
        K8sClient::pod_phase(self, name).await
    }

    async fn delete_pod(&self, name: &str) -> SuiteResult<()> {
        K8sClient::delete_pod(self, name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::PodStatus;

    #[test]
    fn test_pod_phase_parsing() {
        assert_eq!(PodPhase::from("Running"), PodPhase::Running);
        assert_eq!(PodPhase::from("Succeeded"), PodPhase::Succeeded);
        assert_eq!(PodPhase::from("Evicted"), PodPhase::Unknown);
        assert!(PodPhase::Failed.is_terminal());
        assert!(!PodPhase::Running.is_terminal());
    }

    #[test]
    fn test_pod_phase_of_pod_without_status() {
        let mut pod = Pod::default();
        assert_eq!(PodPhase::of(&pod), PodPhase::Unknown);

        pod.status = Some(PodStatus {
            phase: Some("Pending".to_string()),
            ..Default::default()
        });
        assert_eq!(PodPhase::of(&pod), PodPhase::Pending);
    }
}
