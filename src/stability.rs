//! Bounded polling and SR-IOV stabilization waits
//!
//! All waits in the suite are fixed-interval polls against a deadline. A
//! predicate error aborts the wait immediately; running out of time yields
//! [`SuiteError::Timeout`].

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

use crate::error::{SuiteError, SuiteResult};

/// Poll `predicate` every `interval` until it returns `Some`, or fail once
/// `timeout` has elapsed. The predicate is always evaluated at least once.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut predicate: F,
) -> SuiteResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SuiteResult<Option<T>>>,
{
    let deadline = Instant::now() + timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        if let Some(value) = predicate().await? {
            debug!(what, attempts, "Condition met");
            return Ok(value);
        }
        if Instant::now() + interval > deadline {
            return Err(SuiteError::timeout(what, timeout));
        }
        sleep(interval).await;
    }
}

/// Boolean form of [`poll_until`]
pub async fn poll_until_true<F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut predicate: F,
) -> SuiteResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SuiteResult<bool>>,
{
    poll_until(what, interval, timeout, || {
        let fut = predicate();
        async move { Ok(fut.await?.then_some(())) }
    })
    .await
}

/// The two readiness questions asked before and after reconfiguring SR-IOV
#[allow(async_fn_in_trait)]
pub trait StabilityProbe {
    /// Has the operator finished syncing every node state?
    async fn operator_stable(&self) -> SuiteResult<bool>;

    /// Are all nodes schedulable and ready again?
    async fn cluster_stable(&self) -> SuiteResult<bool>;
}

/// Timing of [`wait_for_stable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizationPolicy {
    /// Unconditional pause before the first poll
    pub initial_delay: Duration,
    pub operator_timeout: Duration,
    pub cluster_timeout: Duration,
    pub interval: Duration,
}

impl Default for StabilizationPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            operator_timeout: Duration::from_secs(20 * 60),
            cluster_timeout: Duration::from_secs(20 * 60),
            interval: Duration::from_secs(1),
        }
    }
}

/// Block until the operator and then the cluster report stable.
///
/// The operator may not have noticed a freshly applied change yet, and with
/// nothing to apply it never reports unstable at all, so the two cases cannot
/// be told apart right after a change. The initial delay covers that window.
#[instrument(skip_all)]
pub async fn wait_for_stable<P: StabilityProbe>(
    probe: &P,
    policy: &StabilizationPolicy,
) -> SuiteResult<()> {
    sleep(policy.initial_delay).await;

    poll_until_true(
        "SR-IOV operator to become stable",
        policy.interval,
        policy.operator_timeout,
        || probe.operator_stable(),
    )
    .await?;

    poll_until_true(
        "cluster to become stable",
        policy.interval,
        policy.cluster_timeout,
        || probe.cluster_stable(),
    )
    .await?;

    info!("SR-IOV configuration is stable");
    Ok(())
}
