//! The polling loop.

use crate::backoff::Backoff;
use crate::outcome::WaitOutcome;
use crate::policy::WaitPolicy;
use crate::reference::OperationReference;
use crate::status::{OperationState, OperationStatus};
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const MISSING_FAILURE_DETAIL: &str = "operation failed without error detail";

/// Polls one operation at a time until it finishes, the deadline passes or
/// the cancellation token fires.
///
/// The first poll happens immediately. After each non-terminal poll the
/// waiter sleeps for the next [`Backoff`] interval, clamped to whatever is
/// left of `overall_timeout`, so one last poll always lands on the deadline.
/// Errors from the poll function are returned as-is and end the wait.
#[derive(Debug, Clone)]
pub struct OperationWaiter {
    policy: WaitPolicy,
    cancellation: Option<CancellationToken>,
}

impl OperationWaiter {
    pub fn new(policy: WaitPolicy) -> Self {
        Self {
            policy,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    pub async fn wait<F, Fut, E>(
        &self,
        reference: &OperationReference,
        mut poll: F,
    ) -> Result<WaitOutcome, E>
    where
        F: FnMut(OperationReference) -> Fut,
        Fut: Future<Output = Result<OperationStatus, E>>,
    {
        let start = Instant::now();
        let timeout = self.policy.overall_timeout();
        let mut backoff = Backoff::from_policy(&self.policy);
        let mut last_status: Option<OperationStatus> = None;
        let mut attempt: u32 = 0;

        loop {
            if self.is_cancelled() {
                let elapsed = start.elapsed();
                warn!(
                    "Wait for operation {} cancelled after {:?} ({} polls)",
                    reference, elapsed, attempt
                );
                return Ok(WaitOutcome::Cancelled {
                    elapsed,
                    last_status,
                });
            }

            attempt += 1;
            let status = poll(reference.clone()).await?;

            match status.state() {
                OperationState::Succeeded => {
                    info!(
                        "Operation {} succeeded after {:?} ({} polls)",
                        reference,
                        start.elapsed(),
                        attempt
                    );
                    return Ok(WaitOutcome::Completed(status));
                }
                OperationState::Failed => {
                    let detail = status
                        .error_detail()
                        .unwrap_or(MISSING_FAILURE_DETAIL)
                        .to_string();
                    info!(
                        "Operation {} failed after {:?} ({} polls): {}",
                        reference,
                        start.elapsed(),
                        attempt,
                        detail
                    );
                    return Ok(WaitOutcome::Failed { detail });
                }
                OperationState::Pending | OperationState::Running => {}
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                warn!(
                    "Timed out waiting for operation {} after {:?} ({} polls, last state {})",
                    reference,
                    elapsed,
                    attempt,
                    status.state()
                );
                return Ok(WaitOutcome::TimedOut {
                    elapsed,
                    last_status: Some(status),
                });
            }

            let delay = backoff
                .next()
                .unwrap_or(self.policy.max_interval())
                .min(timeout.saturating_sub(elapsed));
            debug!(
                "Operation {} poll #{}: {}, next poll in {:?}",
                reference, attempt, status, delay
            );
            last_status = Some(status);

            if !self.sleep(delay).await {
                let elapsed = start.elapsed();
                warn!(
                    "Wait for operation {} cancelled after {:?} ({} polls)",
                    reference, elapsed, attempt
                );
                return Ok(WaitOutcome::Cancelled {
                    elapsed,
                    last_status,
                });
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Returns `false` if the token fired before the delay elapsed.
    async fn sleep(&self, delay: Duration) -> bool {
        match self.cancellation {
            Some(ref token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => false,
                    _ = tokio::time::sleep(delay) => true,
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                true
            }
        }
    }
}

/// Wait on `reference` with `policy` and no cancellation.
pub async fn wait<F, Fut, E>(
    reference: &OperationReference,
    poll: F,
    policy: WaitPolicy,
) -> Result<WaitOutcome, E>
where
    F: FnMut(OperationReference) -> Fut,
    Fut: Future<Output = Result<OperationStatus, E>>,
{
    OperationWaiter::new(policy).wait(reference, poll).await
}
