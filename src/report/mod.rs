//! Suite reporting
//!
//! Collects scenario results into a [`SuiteReport`], renders JUnit XML and
//! dumps cluster state when something failed.

mod dump;
mod junit;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::scenario::{ScenarioOutcome, ScenarioResult};

pub use dump::{ClusterDumper, DumpSink, REPORTER_OUTPUT_ENV};
pub use junit::{to_junit, write_junit};

/// Synthetic case name for a failed before-all phase
pub const SETUP_CASE: &str = "[BeforeAll] SR-IOV setup";
/// Synthetic case name for a failed after-suite phase
pub const TEARDOWN_CASE: &str = "[AfterSuite] SR-IOV teardown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseStatus {
    Passed,
    Skipped(String),
    Failed(String),
}

/// One line of the report
#[derive(Debug, Clone)]
pub struct ReportCase {
    pub name: String,
    pub status: CaseStatus,
    pub duration: Duration,
}

impl From<&ScenarioResult> for ReportCase {
    fn from(result: &ScenarioResult) -> Self {
        let status = match &result.outcome {
            ScenarioOutcome::Passed => CaseStatus::Passed,
            ScenarioOutcome::Skipped(reason) => CaseStatus::Skipped(reason.to_string()),
            ScenarioOutcome::Failed(reason) => CaseStatus::Failed(reason.clone()),
        };
        Self {
            name: result.name.clone(),
            status,
            duration: result.duration,
        }
    }
}

/// Outcome of a whole suite run
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
    pub results: Vec<ScenarioResult>,
    pub setup_error: Option<String>,
    pub teardown_error: Option<String>,
}

impl SuiteReport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            started_at: Utc::now(),
            duration: Duration::ZERO,
            results: Vec::new(),
            setup_error: None,
            teardown_error: None,
        }
    }

    pub fn passed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == ScenarioOutcome::Passed)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, ScenarioOutcome::Skipped(_)))
            .count()
    }

    /// No scenario failed and both suite phases completed
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.setup_error.is_none() && self.teardown_error.is_none()
    }

    /// All report lines, including synthetic ones for failed suite phases
    pub fn cases(&self) -> Vec<ReportCase> {
        let mut cases = Vec::with_capacity(self.results.len() + 2);
        if let Some(err) = &self.setup_error {
            cases.push(ReportCase {
                name: SETUP_CASE.to_string(),
                status: CaseStatus::Failed(err.clone()),
                duration: Duration::ZERO,
            });
        }
        cases.extend(self.results.iter().map(ReportCase::from));
        if let Some(err) = &self.teardown_error {
            cases.push(ReportCase {
                name: TEARDOWN_CASE.to_string(),
                status: CaseStatus::Failed(err.clone()),
                duration: Duration::ZERO,
            });
        }
        cases
    }
}
