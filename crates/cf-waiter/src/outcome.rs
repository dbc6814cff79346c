//! How a wait ended.

use crate::status::OperationStatus;
use std::time::Duration;
use thiserror::Error;

/// Result of [`crate::OperationWaiter::wait`] when no transport error occurred.
///
/// `TimedOut` and `Cancelled` are distinct from `Failed`: the remote
/// operation may still be running when either is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The last poll reported `Succeeded`.
    Completed(OperationStatus),
    /// The last poll reported `Failed`; `detail` is its error detail, verbatim.
    Failed { detail: String },
    TimedOut {
        elapsed: Duration,
        last_status: Option<OperationStatus>,
    },
    Cancelled {
        elapsed: Duration,
        last_status: Option<OperationStatus>,
    },
}

impl WaitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Turn every non-success outcome into a [`WaitError`].
    pub fn into_result(self) -> Result<OperationStatus, WaitError> {
        match self {
            Self::Completed(status) => Ok(status),
            Self::Failed { detail } => Err(WaitError::OperationFailed { detail }),
            Self::TimedOut {
                elapsed,
                last_status,
            } => Err(WaitError::TimedOut {
                elapsed,
                last_status,
            }),
            Self::Cancelled { elapsed, .. } => Err(WaitError::Cancelled { elapsed }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("operation failed: {detail}")]
    OperationFailed { detail: String },
    #[error("timed out after {elapsed:?} waiting for operation")]
    TimedOut {
        elapsed: Duration,
        last_status: Option<OperationStatus>,
    },
    #[error("wait cancelled after {elapsed:?}")]
    Cancelled { elapsed: Duration },
}
