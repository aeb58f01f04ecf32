//! Cluster state dumps for failed scenarios

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::SuiteResult;
use crate::k8s::K8sClient;
use crate::sriov::{SriovClient, SriovKind};

/// Environment variable naming a file that dumps are appended to
pub const REPORTER_OUTPUT_ENV: &str = "REPORTER_OUTPUT";

/// Where cluster dumps go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpSink {
    Stdout,
    File(PathBuf),
}

impl DumpSink {
    /// `REPORTER_OUTPUT` wins over the dump flag; neither means no dumps
    pub fn select(reporter_output: Option<&str>, dump: bool) -> Option<Self> {
        match reporter_output {
            Some(path) if !path.is_empty() => Some(DumpSink::File(PathBuf::from(path))),
            _ if dump => Some(DumpSink::Stdout),
            _ => None,
        }
    }

    pub fn from_env(dump: bool) -> Option<Self> {
        let reporter_output = std::env::var(REPORTER_OUTPUT_ENV).ok();
        Self::select(reporter_output.as_deref(), dump)
    }

    fn write_all(&self, contents: &str) -> SuiteResult<()> {
        match self {
            DumpSink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(contents.as_bytes())?;
                stdout.flush()?;
            }
            DumpSink::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(contents.as_bytes())?;
            }
        }
        Ok(())
    }
}

/// Render one section; collection errors are written in place of the objects
fn render_section<T: Serialize>(out: &mut String, title: &str, items: SuiteResult<Vec<T>>) {
    out.push_str(&format!("--- {} ---\n", title));
    match items.map(|items| serde_yaml::to_string(&items)) {
        Ok(Ok(yaml)) => out.push_str(&yaml),
        Ok(Err(e)) => out.push_str(&format!("# failed to render: {}\n", e)),
        Err(e) => {
            warn!(section = title, error = %e, "Failed to collect objects for dump");
            out.push_str(&format!("# failed to collect: {}\n", e));
        }
    }
}

/// Writes pods and SR-IOV resources to a sink
pub struct ClusterDumper {
    k8s: K8sClient,
    sriov: SriovClient,
    sink: DumpSink,
}

impl ClusterDumper {
    pub fn new(k8s: K8sClient, sriov: SriovClient, sink: DumpSink) -> Self {
        Self { k8s, sriov, sink }
    }

    pub async fn dump(&self, reason: &str) -> SuiteResult<()> {
        let mut out = format!(
            "=== Cluster dump at {} ===\n# reason: {}\n",
            Utc::now().to_rfc3339(),
            reason.replace('\n', " ")
        );

        render_section(
            &mut out,
            &format!("Pods in {}", self.k8s.namespace()),
            self.k8s.list_pods().await,
        );
        for kind in [SriovKind::NodePolicy, SriovKind::Network, SriovKind::NodeState] {
            render_section(&mut out, kind.kind(), self.sriov.list(kind).await);
        }

        self.sink.write_all(&out)?;
        info!(sink = ?self.sink, "Dumped cluster state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuiteError;

    #[test]
    fn test_sink_selection() {
        assert_eq!(
            DumpSink::select(Some("/tmp/report.log"), false),
            Some(DumpSink::File(PathBuf::from("/tmp/report.log")))
        );
        assert_eq!(
            DumpSink::select(Some("/tmp/report.log"), true),
            Some(DumpSink::File(PathBuf::from("/tmp/report.log")))
        );
        assert_eq!(DumpSink::select(Some(""), true), Some(DumpSink::Stdout));
        assert_eq!(DumpSink::select(None, true), Some(DumpSink::Stdout));
        assert_eq!(DumpSink::select(None, false), None);
    }

    #[test]
    fn test_render_section() {
        let mut out = String::new();
        render_section(&mut out, "Names", Ok(vec!["a", "b"]));
        render_section::<String>(&mut out, "Broken", Err(SuiteError::internal("forbidden")));

        assert!(out.starts_with("--- Names ---\n- a\n- b\n"));
        assert!(out.contains("--- Broken ---\n# failed to collect: internal error: forbidden\n"));
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reporter.log");
        let sink = DumpSink::File(path.clone());

        sink.write_all("first\n").unwrap();
        sink.write_all("second\n").unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), "first\nsecond\n");
    }
}
