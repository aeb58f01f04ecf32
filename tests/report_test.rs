//! Tests for suite reports and their JUnit rendering

use std::time::Duration;

use tokio_test::assert_ok;

use sriov_conformance::report::{to_junit, write_junit, CaseStatus, SuiteReport, SETUP_CASE, TEARDOWN_CASE};
use sriov_conformance::scenario::{ScenarioOutcome, ScenarioResult, SkipReason};
use sriov_conformance::{Connectivity, ConnectivityTestParameters, Mtu, Protocol};

fn result(mtu: Mtu, connectivity: Connectivity, outcome: ScenarioOutcome) -> ScenarioResult {
    let params = ConnectivityTestParameters::from_parts(mtu, connectivity, Protocol::Icmp);
    ScenarioResult {
        name: params.describe("CNF SRIOV"),
        params,
        outcome,
        duration: Duration::from_millis(1500),
    }
}

fn mixed_report() -> SuiteReport {
    let mut report = SuiteReport::new("SRIOV Operator conformance tests");
    report.results.push(result(Mtu::Custom, Connectivity::DiffNode, ScenarioOutcome::Passed));
    report.results.push(result(
        Mtu::Standard,
        Connectivity::DiffNode,
        ScenarioOutcome::Skipped(SkipReason::NotEnoughNodes {
            required: 2,
            available: 1,
        }),
    ));
    report.results.push(result(
        Mtu::Jumbo,
        Connectivity::SameNodeSamePf,
        ScenarioOutcome::Failed("pod testpod-abc ended in phase Failed".to_string()),
    ));
    report
}

#[test]
fn test_counts_and_success() {
    let report = mixed_report();
    assert_eq!(report.passed(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());

    let mut clean = SuiteReport::new("clean");
    clean.results.push(result(Mtu::Custom, Connectivity::DiffNode, ScenarioOutcome::Passed));
    assert!(clean.is_success());

    clean.teardown_error = Some("namespace still present".to_string());
    assert!(!clean.is_success());
}

#[test]
fn test_junit_document() {
    let xml = to_junit(&mixed_report());

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>"));
    assert!(xml.contains(
        "<testsuite name=\"SRIOV Operator conformance tests\" tests=\"3\" failures=\"1\" errors=\"0\" skipped=\"1\""
    ));
    assert!(xml.contains(
        "name=\"CNF SRIOV {&quot;Protocol&quot;:&quot;icmp&quot;,&quot;MTU&quot;:1450,&quot;Connectivity&quot;:&quot;diff-node&quot;}\" time=\"1.500\"></testcase>"
    ));
    assert!(xml.contains("<skipped message=\"Nodes number less than 2 (found 1)\"/>"));
    assert!(xml.contains("<failure message=\"pod testpod-abc ended in phase Failed\" type=\"Failure\">"));
    assert!(xml.ends_with("</testsuite></testsuites>\n"));
}

#[test]
fn test_setup_failure_is_reported_as_a_case() {
    let mut report = SuiteReport::new("SRIOV Operator conformance tests");
    report.setup_error = Some("timed out after 1200s waiting for SR-IOV operator".to_string());
    report.teardown_error = Some("namespace <sriov-operator-tests> stuck".to_string());

    let cases = report.cases();
    assert_eq!(cases.len(), 2);
    assert_eq!(cases[0].name, SETUP_CASE);
    assert!(matches!(&cases[0].status, CaseStatus::Failed(msg) if msg.contains("SR-IOV operator")));
    assert_eq!(cases[1].name, TEARDOWN_CASE);

    let xml = to_junit(&report);
    assert!(xml.contains("tests=\"2\" failures=\"2\""));
    assert!(xml.contains("namespace &lt;sriov-operator-tests&gt; stuck"));
    assert!(!report.is_success());
}

#[test]
fn test_write_junit_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("sriov_suite.xml");

    assert_ok!(write_junit(&mixed_report(), &path));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("tests=\"3\""));
}
