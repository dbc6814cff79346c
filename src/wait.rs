//! Glue between Cloud Controller resources and the waiter.

use crate::error::{OperationsError, OperationsResult};
use crate::CloudFoundryOperations;
use cf_client::CfResult;
use cf_waiter::{
    HasOperationStatus, OperationReference, OperationState, OperationStatus, OperationWaiter,
    WaitOutcome, WaitPolicy,
};
use std::future::Future;
use std::sync::{Mutex, PoisonError};

impl CloudFoundryOperations {
    pub(crate) fn waiter(&self, policy: WaitPolicy) -> OperationWaiter {
        let waiter = OperationWaiter::new(policy);
        match self.cancellation {
            Some(ref token) => waiter.with_cancellation(token.clone()),
            None => waiter,
        }
    }

    /// Wait on a status-only poll function.
    pub(crate) async fn wait_for_status<F, Fut>(
        &self,
        reference: &OperationReference,
        policy: WaitPolicy,
        poll: F,
    ) -> CfResult<WaitOutcome>
    where
        F: FnMut(OperationReference) -> Fut,
        Fut: Future<Output = CfResult<OperationStatus>>,
    {
        self.waiter(policy).wait(reference, poll).await
    }

    /// Wait until `initial` (the resource returned by the submitting call)
    /// reaches a terminal state, re-fetching it with `fetch`. An already
    /// terminal resource is settled without polling. Returns the last
    /// resource seen.
    pub(crate) async fn wait_for_resource<R, F, Fut>(
        &self,
        initial: R,
        reference: &OperationReference,
        policy: WaitPolicy,
        fetch: F,
    ) -> CfResult<(WaitOutcome, R)>
    where
        R: HasOperationStatus,
        F: Fn(OperationReference) -> Fut,
        Fut: Future<Output = CfResult<R>>,
    {
        let status = initial.operation_status();
        if status.is_terminal() {
            return Ok((terminal_outcome(status), initial));
        }

        let latest: Mutex<Option<R>> = Mutex::new(None);
        let slot = &latest;
        let outcome = self
            .waiter(policy)
            .wait(reference, move |r| {
                let pending = fetch(r);
                async move {
                    let resource = pending.await?;
                    let status = resource.operation_status();
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(resource);
                    Ok(status)
                }
            })
            .await?;

        let last = latest
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or(initial);
        Ok((outcome, last))
    }
}

/// The outcome a wait would report for a status that is already terminal.
pub(crate) fn terminal_outcome(status: OperationStatus) -> WaitOutcome {
    match status.state() {
        OperationState::Failed => WaitOutcome::Failed {
            detail: status.error_detail().unwrap_or_default().to_string(),
        },
        _ => WaitOutcome::Completed(status),
    }
}

/// Map a non-success outcome to an error naming `subject` and `action`.
pub(crate) fn settle(
    outcome: WaitOutcome,
    subject: &str,
    action: &'static str,
) -> OperationsResult<OperationStatus> {
    outcome
        .into_result()
        .map_err(|e| OperationsError::from_wait(subject, action, e))
}
