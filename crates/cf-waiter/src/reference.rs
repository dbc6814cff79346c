//! Identifier of a remote long-running operation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejection reasons for [`OperationReference::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("operation reference must not be empty")]
    Empty,
}

/// Opaque identifier of a job, build, package or service instance whose
/// progress is being polled. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OperationReference(String);

impl OperationReference {
    pub fn new(id: impl Into<String>) -> Result<Self, ReferenceError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ReferenceError::Empty);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OperationReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OperationReference {
    type Error = ReferenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for OperationReference {
    type Error = ReferenceError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OperationReference> for String {
    fn from(value: OperationReference) -> Self {
        value.0
    }
}
