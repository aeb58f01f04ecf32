//! SR-IOV operator API client
//!
//! Handles creating, listing, and deleting the operator's custom resources

use kube::{
    api::{Api, DeleteParams, DynamicObject, ListParams, PostParams},
    Client,
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use super::resources::DEFAULT_POLICY_NAME;
use super::types::*;
use crate::error::SuiteResult;

/// Client for the operator's resources in its own namespace
#[derive(Clone)]
pub struct SriovClient {
    client: Client,
    namespace: String,
}

impl SriovClient {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
        }
    }

    /// Namespace the operator watches
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn api(&self, kind: SriovKind) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), &self.namespace, &kind.api_resource())
    }

    /// Create a resource from a manifest; returns the name the server assigned
    #[instrument(skip(self, manifest))]
    pub async fn create(&self, kind: SriovKind, manifest: Value) -> SuiteResult<String> {
        let obj: DynamicObject = serde_json::from_value(manifest)?;

        match self.api(kind).create(&PostParams::default(), &obj).await {
            Ok(created) => {
                let name = created.metadata.name.unwrap_or_default();
                info!(%name, "Created {}", kind);
                Ok(name)
            }
            Err(e) => {
                error!("Failed to create {}: {}", kind, e);
                Err(e.into())
            }
        }
    }

    pub async fn list(&self, kind: SriovKind) -> SuiteResult<Vec<DynamicObject>> {
        Ok(self.api(kind).list(&ListParams::default()).await?.items)
    }

    /// Delete a resource by name; a missing object counts as deleted
    #[instrument(skip(self))]
    pub async fn delete(&self, kind: SriovKind, name: &str) -> SuiteResult<()> {
        match self.api(kind).delete(name, &DeleteParams::default()).await {
            Ok(_) => {
                info!("Deleted {} '{}'", kind, name);
                Ok(())
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                warn!("{} '{}' not found (already deleted?)", kind, name);
                Ok(())
            }
            Err(e) => {
                error!("Failed to delete {} '{}': {}", kind, name, e);
                Err(e.into())
            }
        }
    }

    /// Remove every node policy except the operator's default one
    pub async fn remove_all_policies(&self) -> SuiteResult<()> {
        let policies = self.list(SriovKind::NodePolicy).await?;
        for name in removable_policy_names(&policies) {
            self.delete(SriovKind::NodePolicy, &name).await?;
        }
        Ok(())
    }

    /// Remove every SriovNetwork in the operator namespace
    pub async fn remove_all_networks(&self) -> SuiteResult<()> {
        let networks = self.list(SriovKind::Network).await?;
        for network in networks {
            if let Some(name) = network.metadata.name {
                self.delete(SriovKind::Network, &name).await?;
            }
        }
        Ok(())
    }

    /// Typed node states reported by the config daemons
    pub async fn node_states(&self) -> SuiteResult<Vec<NodeState>> {
        self.list(SriovKind::NodeState)
            .await?
            .iter()
            .map(NodeState::from_dynamic)
            .collect()
    }
}

/// Names of policies the suite may delete
fn removable_policy_names(policies: &[DynamicObject]) -> Vec<String> {
    policies
        .iter()
        .filter_map(|p| p.metadata.name.clone())
        .filter(|name| name != DEFAULT_POLICY_NAME)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy(name: &str) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "sriovnetwork.openshift.io/v1",
            "kind": "SriovNetworkNodePolicy",
            "metadata": {"name": name}
        }))
        .unwrap()
    }

    #[test]
    fn test_default_policy_is_kept() {
        let policies = vec![
            policy("default"),
            policy("test-policy-usualx7k2p"),
            policy("test-policy-jumbo9fq4d"),
        ];
        assert_eq!(
            removable_policy_names(&policies),
            vec!["test-policy-usualx7k2p", "test-policy-jumbo9fq4d"]
        );
    }
}
