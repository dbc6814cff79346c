//! Errors surfaced by the high-level operations.

use cf_client::CfError;
use cf_waiter::{PolicyError, ReferenceError, WaitError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationsError {
    /// Transport or API failure, surfaced as soon as it happens.
    #[error(transparent)]
    Client(#[from] CfError),

    #[error("invalid wait policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("invalid reference: {0}")]
    Reference(#[from] ReferenceError),

    #[error("{subject} does not exist")]
    NotFound { subject: String },

    #[error("{subject} failed during {action}: {detail}")]
    Failed {
        subject: String,
        action: &'static str,
        detail: String,
    },

    /// The remote operation may still be running.
    #[error("{subject} timed out during {action}")]
    TimedOut {
        subject: String,
        action: &'static str,
        elapsed: Duration,
    },

    #[error("{subject} {action} was cancelled")]
    Cancelled {
        subject: String,
        action: &'static str,
        elapsed: Duration,
    },
}

impl OperationsError {
    pub(crate) fn from_wait(subject: &str, action: &'static str, err: WaitError) -> Self {
        let subject = subject.to_string();
        match err {
            WaitError::OperationFailed { detail } => Self::Failed {
                subject,
                action,
                detail,
            },
            WaitError::TimedOut { elapsed, .. } => Self::TimedOut {
                subject,
                action,
                elapsed,
            },
            WaitError::Cancelled { elapsed } => Self::Cancelled {
                subject,
                action,
                elapsed,
            },
        }
    }

    /// The Cloud Controller error behind this one, if any.
    pub fn client_error(&self) -> Option<&CfError> {
        match self {
            Self::Client(e) => Some(e),
            _ => None,
        }
    }
}

pub type OperationsResult<T> = Result<T, OperationsError>;
