use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sriov_conformance::{
    config::{Config, CONFIG_PATH},
    k8s::K8sClient,
    report::{write_junit, ClusterDumper, DumpSink},
    Suite,
};

/// SR-IOV operator conformance tests
#[derive(Parser, Debug)]
#[command(name = "sriov-conformance", version, about, long_about = None)]
struct Cli {
    /// The path for the junit format report
    #[arg(long)]
    junit: Option<PathBuf>,

    /// Dump cluster state for failed tests
    #[arg(long)]
    dump: bool,

    /// Path to the suite configuration file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration from {}: {}", cli.config.display(), e);
            return Ok(ExitCode::from(2));
        }
    };
    tracing::info!("Configuration loaded");

    let junit_path = cli
        .junit
        .clone()
        .unwrap_or_else(|| config.report_path("sriov_suite"));

    let k8s = K8sClient::new(config.kubeconfig.as_deref(), &config.test_namespace)
        .await
        .context("Client misconfigured, check the $KUBECONFIG env variable")?;
    k8s.health_check().await?;

    let mut suite = Suite::new(config, k8s.clone());
    if let Some(sink) = DumpSink::from_env(cli.dump) {
        let dumper = ClusterDumper::new(k8s, suite.sriov().clone(), sink);
        suite = suite.with_dumper(dumper);
    }

    tracing::info!("Running SRIOV Operator conformance tests");
    let report = suite.run().await;

    write_junit(&report, &junit_path)
        .with_context(|| format!("Failed to write JUnit report to {}", junit_path.display()))?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
