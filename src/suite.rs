//! Suite lifecycle: before-all setup, sequential scenarios, after-suite teardown

use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use crate::config::Config;
use crate::error::{SuiteError, SuiteResult};
use crate::k8s::K8sClient;
use crate::report::{ClusterDumper, SuiteReport};
use crate::scenario::{connectivity_matrix, ScenarioOutcome, ScenarioRunner, TABLE_TITLE};
use crate::sriov::{self, ClusterProbe, EnabledNodes, SriovClient, SriovKind, TEMPLATES};
use crate::stability::{wait_for_stable, StabilizationPolicy};

pub const SUITE_NAME: &str = "SRIOV Operator conformance tests";

/// Prefix of every scenario name
pub const DESCRIBE: &str = "CNF SRIOV";

/// Time allowed for the workload namespace to disappear at teardown
pub const NAMESPACE_DELETE_TIMEOUT: Duration = Duration::from_secs(1800);

/// Owns the cluster clients and the discovered node snapshot for one run
pub struct Suite {
    config: Config,
    k8s: K8sClient,
    sriov: SriovClient,
    dumper: Option<ClusterDumper>,
    enabled: EnabledNodes,
}

impl Suite {
    pub fn new(config: Config, k8s: K8sClient) -> Self {
        let sriov = SriovClient::new(k8s.inner().clone(), &config.operator_namespace);
        Self {
            config,
            k8s,
            sriov,
            dumper: None,
            enabled: EnabledNodes::default(),
        }
    }

    pub fn with_dumper(mut self, dumper: ClusterDumper) -> Self {
        self.dumper = Some(dumper);
        self
    }

    pub fn sriov(&self) -> &SriovClient {
        &self.sriov
    }

    async fn wait_for_stable(&self) -> SuiteResult<()> {
        let probe = ClusterProbe {
            k8s: &self.k8s,
            sriov: &self.sriov,
        };
        wait_for_stable(&probe, &StabilizationPolicy::default()).await
    }

    /// Start from a clean operator, then create one policy and one network
    /// per MTU class
    #[instrument(skip(self))]
    pub async fn setup(&mut self) -> SuiteResult<()> {
        self.sriov.remove_all_networks().await?;
        self.sriov.remove_all_policies().await?;
        self.wait_for_stable().await?;

        self.enabled =
            sriov::discover_sriov(&self.k8s, &self.sriov, &self.config.node_selector_label).await?;

        self.k8s.create_namespace().await?;

        let namespace = self.sriov.namespace();
        for template in &TEMPLATES {
            let manifest = template.policy_manifest(
                namespace,
                &self.config.node_selector_label,
                &self.config.pf_name,
            )?;
            self.sriov.create(SriovKind::NodePolicy, manifest).await?;
        }
        for template in &TEMPLATES {
            let manifest = template.network_manifest(namespace, self.k8s.namespace())?;
            self.sriov.create(SriovKind::Network, manifest).await?;
        }

        self.wait_for_stable().await?;
        info!(nodes = self.enabled.len(), "Suite setup complete");
        Ok(())
    }

    /// Run every matrix entry in order
    pub async fn run_scenarios(&self, report: &mut SuiteReport) {
        let runner = ScenarioRunner::new(&self.k8s, &self.enabled, &self.config.test_image);

        for params in connectivity_matrix() {
            let name = format!("{} {} {}", DESCRIBE, TABLE_TITLE, params.describe(""));
            let result = runner.run(&name, &params).await;
            if let ScenarioOutcome::Failed(reason) = &result.outcome {
                self.dump(&format!("{}: {}", name, reason)).await;
            }
            report.results.push(result);
        }
    }

    /// Remove everything the suite created. Every step is attempted; the
    /// first error is returned once all have run.
    #[instrument(skip(self))]
    pub async fn teardown(&self) -> SuiteResult<()> {
        let mut first_error: Option<SuiteError> = None;
        let mut record = |step: &str, result: SuiteResult<()>| {
            if let Err(e) = result {
                error!(step, error = %e, "Teardown step failed");
                first_error.get_or_insert(e);
            }
        };

        record("remove networks", self.sriov.remove_all_networks().await);
        record("remove policies", self.sriov.remove_all_policies().await);
        record(
            "delete namespace",
            self.k8s.delete_namespace_and_wait(NAMESPACE_DELETE_TIMEOUT).await,
        );
        record("wait for stable", self.wait_for_stable().await);

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Suite teardown complete");
                Ok(())
            }
        }
    }

    async fn dump(&self, reason: &str) {
        if let Some(dumper) = &self.dumper {
            if let Err(e) = dumper.dump(reason).await {
                warn!(error = %e, "Failed to dump cluster state");
            }
        }
    }

    /// Full run: setup, scenarios when setup succeeded, teardown regardless
    pub async fn run(mut self) -> SuiteReport {
        let started = Instant::now();
        let mut report = SuiteReport::new(SUITE_NAME);

        match self.setup().await {
            Ok(()) => self.run_scenarios(&mut report).await,
            Err(e) => {
                error!(error = %e, "Suite setup failed");
                self.dump(&format!("setup failed: {}", e)).await;
                report.setup_error = Some(e.to_string());
            }
        }

        if let Err(e) = self.teardown().await {
            self.dump(&format!("teardown failed: {}", e)).await;
            report.teardown_error = Some(e.to_string());
        }

        report.duration = started.elapsed();
        info!(
            passed = report.passed(),
            failed = report.failed(),
            skipped = report.skipped(),
            "Suite finished"
        );
        report
    }
}
