//! Tests for the stabilization wait
//!
//! Time is paused, so the multi-minute timeouts elapse instantly.

use std::cell::Cell;
use std::time::Duration;

use tokio::time::Instant;

use sriov_conformance::stability::{wait_for_stable, StabilityProbe, StabilizationPolicy};
use sriov_conformance::{SuiteError, SuiteResult};

/// Reports stable from the given call number on (1-based); `None` means never
#[derive(Default)]
struct FakeProbe {
    operator_after: Option<u32>,
    cluster_after: Option<u32>,
    operator_fails: bool,
    operator_calls: Cell<u32>,
    cluster_calls: Cell<u32>,
    first_poll: Cell<Option<Instant>>,
}

impl FakeProbe {
    fn new(operator_after: Option<u32>, cluster_after: Option<u32>) -> Self {
        Self {
            operator_after,
            cluster_after,
            ..Default::default()
        }
    }

    fn note_poll(&self) {
        if self.first_poll.get().is_none() {
            self.first_poll.set(Some(Instant::now()));
        }
    }
}

impl StabilityProbe for FakeProbe {
    async fn operator_stable(&self) -> SuiteResult<bool> {
        self.note_poll();
        self.operator_calls.set(self.operator_calls.get() + 1);
        if self.operator_fails {
            return Err(SuiteError::internal("node states unavailable"));
        }
        Ok(self
            .operator_after
            .is_some_and(|n| self.operator_calls.get() >= n))
    }

    async fn cluster_stable(&self) -> SuiteResult<bool> {
        self.note_poll();
        self.cluster_calls.set(self.cluster_calls.get() + 1);
        Ok(self
            .cluster_after
            .is_some_and(|n| self.cluster_calls.get() >= n))
    }
}

fn policy() -> StabilizationPolicy {
    StabilizationPolicy {
        initial_delay: Duration::from_secs(5),
        operator_timeout: Duration::from_secs(60),
        cluster_timeout: Duration::from_secs(30),
        interval: Duration::from_secs(1),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stable_when_both_predicates_hold() {
    let probe = FakeProbe::new(Some(3), Some(2));
    let start = Instant::now();

    wait_for_stable(&probe, &policy()).await.unwrap();

    assert_eq!(probe.operator_calls.get(), 3);
    assert_eq!(probe.cluster_calls.get(), 2);
    assert!(start.elapsed() >= Duration::from_secs(5 + 2 + 1));
}

#[tokio::test(start_paused = true)]
async fn test_initial_delay_precedes_first_poll() {
    let probe = FakeProbe::new(Some(1), Some(1));
    let start = Instant::now();

    wait_for_stable(&probe, &policy()).await.unwrap();

    let first = probe.first_poll.get().unwrap();
    assert!(first.duration_since(start) >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_operator_timeout() {
    let probe = FakeProbe::new(None, Some(1));

    let err = wait_for_stable(&probe, &policy()).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("SR-IOV operator"));
    assert_eq!(probe.cluster_calls.get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cluster_timeout() {
    let probe = FakeProbe::new(Some(1), None);

    let err = wait_for_stable(&probe, &policy()).await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("cluster"));
    assert!(probe.cluster_calls.get() > 1);
}

#[tokio::test(start_paused = true)]
async fn test_predicate_error_aborts_immediately() {
    let probe = FakeProbe {
        operator_fails: true,
        ..FakeProbe::new(Some(1), Some(1))
    };

    let err = wait_for_stable(&probe, &policy()).await.unwrap_err();

    assert!(matches!(err, SuiteError::Internal(_)));
    assert_eq!(probe.operator_calls.get(), 1);
    assert_eq!(probe.cluster_calls.get(), 0);
}

#[test]
fn test_default_policy() {
    let policy = StabilizationPolicy::default();
    assert_eq!(policy.initial_delay, Duration::from_secs(5));
    assert_eq!(policy.operator_timeout, Duration::from_secs(1200));
    assert_eq!(policy.cluster_timeout, Duration::from_secs(1200));
    assert_eq!(policy.interval, Duration::from_secs(1));
}
