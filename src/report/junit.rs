//! JUnit XML rendering of a suite run

use std::fs;
use std::path::Path;

use tracing::info;

use super::{CaseStatus, SuiteReport};
use crate::error::SuiteResult;

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Render the report as a single-suite JUnit document
pub fn to_junit(report: &SuiteReport) -> String {
    let cases = report.cases();
    let failures = cases
        .iter()
        .filter(|c| matches!(c.status, CaseStatus::Failed(_)))
        .count();
    let skipped = cases
        .iter()
        .filter(|c| matches!(c.status, CaseStatus::Skipped(_)))
        .count();

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<testsuites><testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\" timestamp=\"{}\">",
        xml_escape(&report.name),
        cases.len(),
        failures,
        skipped,
        report.duration.as_secs_f64(),
        report.started_at.format("%Y-%m-%dT%H:%M:%S"),
    ));
    for case in &cases {
        out.push_str(&format!(
            "<testcase classname=\"{}\" name=\"{}\" time=\"{:.3}\">",
            xml_escape(&report.name),
            xml_escape(&case.name),
            case.duration.as_secs_f64()
        ));
        match &case.status {
            CaseStatus::Passed => {}
            CaseStatus::Skipped(note) => {
                out.push_str(&format!("<skipped message=\"{}\"/>", xml_escape(note)));
            }
            CaseStatus::Failed(note) => {
                out.push_str(&format!(
                    "<failure message=\"{}\" type=\"Failure\">{}</failure>",
                    xml_escape(note),
                    xml_escape(note)
                ));
            }
        }
        out.push_str("</testcase>");
    }
    out.push_str("</testsuite></testsuites>\n");
    out
}

/// Write the JUnit document, creating parent directories as needed
pub fn write_junit(report: &SuiteReport, path: &Path) -> SuiteResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_junit(report))?;
    info!(path = %path.display(), "Wrote JUnit report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape(r#"{"MTU":1450} <a & 'b'>"#),
            "{&quot;MTU&quot;:1450} &lt;a &amp; &apos;b&apos;&gt;"
        );
    }
}
