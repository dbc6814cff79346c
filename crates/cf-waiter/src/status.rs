//! Remote operation state as observed by a single poll.

use serde::Serialize;
use std::fmt;

/// Lifecycle of a remote operation. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl OperationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Snapshot returned by one poll.
///
/// `error_detail` is only ever set on a `Failed` status. The constructors are
/// the only way to build one, so that pairing always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    state: OperationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_hint: Option<String>,
}

impl OperationStatus {
    pub fn pending() -> Self {
        Self::without_detail(OperationState::Pending)
    }

    pub fn running() -> Self {
        Self::without_detail(OperationState::Running)
    }

    pub fn succeeded() -> Self {
        Self::without_detail(OperationState::Succeeded)
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            state: OperationState::Failed,
            error_detail: Some(detail.into()),
            progress_hint: None,
        }
    }

    fn without_detail(state: OperationState) -> Self {
        Self {
            state,
            error_detail: None,
            progress_hint: None,
        }
    }

    /// Attach free-form progress text (the raw remote state, a percentage...).
    pub fn with_progress_hint(mut self, hint: impl Into<String>) -> Self {
        self.progress_hint = Some(hint.into());
        self
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn progress_hint(&self) -> Option<&str> {
        self.progress_hint.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        if let Some(ref hint) = self.progress_hint {
            write!(f, " ({})", hint)?;
        }
        if let Some(ref detail) = self.error_detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

/// Remote resources that carry their own operation state.
pub trait HasOperationStatus {
    fn operation_status(&self) -> OperationStatus;
}

impl HasOperationStatus for OperationStatus {
    fn operation_status(&self) -> OperationStatus {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!OperationState::Pending.is_terminal());
        assert!(!OperationState::Running.is_terminal());
        assert!(OperationState::Succeeded.is_terminal());
        assert!(OperationState::Failed.is_terminal());
    }

    #[test]
    fn error_detail_only_on_failure() {
        assert_eq!(OperationStatus::running().error_detail(), None);
        assert_eq!(OperationStatus::succeeded().error_detail(), None);
        assert_eq!(OperationStatus::pending().state(), OperationState::Pending);
        assert!(OperationStatus::succeeded().is_terminal());
        assert_eq!(OperationStatus::succeeded().progress_hint(), None);
        let failed = OperationStatus::failed("quota exceeded");
        assert_eq!(failed.state(), OperationState::Failed);
        assert_eq!(failed.error_detail(), Some("quota exceeded"));
    }

    #[test]
    fn display_includes_hint_and_detail() {
        let s = OperationStatus::running().with_progress_hint("in progress");
        assert_eq!(s.to_string(), "RUNNING (in progress)");
        assert_eq!(OperationStatus::failed("boom").to_string(), "FAILED: boom");
    }

    #[test]
    fn serializes_camel_case() {
        let v = serde_json::to_value(OperationStatus::failed("x")).unwrap();
        assert_eq!(v, serde_json::json!({ "state": "FAILED", "errorDetail": "x" }));
    }
}
