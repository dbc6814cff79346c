//! # cf-waiter – waiting on remote long-running operations
//!
//! Cloud Foundry answers many mutating requests (deleting an application,
//! provisioning a service instance, staging a package) before the work is
//! done. The caller gets back a reference to a job or resource whose state it
//! must poll until the platform reports success or failure.
//!
//! This crate owns that loop and nothing else. It does not know how to fetch
//! a status: the caller hands it a poll function.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  OperationWaiter  (waiter.rs)                    │
//! │  ├── immediate first poll                        │
//! │  ├── Backoff schedule between polls (backoff.rs) │
//! │  ├── overall deadline from WaitPolicy            │
//! │  └── CancellationToken observed during sleeps    │
//! ├──────────────────────────────────────────────────┤
//! │  WaitPolicy      (policy.rs)                     │
//! │  OperationReference (reference.rs)               │
//! │  OperationStatus / OperationState (status.rs)    │
//! │  WaitOutcome / WaitError (outcome.rs)            │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use cf_waiter::{wait, OperationReference, OperationStatus, WaitOutcome, WaitPolicy};
//!
//! # async fn fetch(_r: OperationReference) -> Result<OperationStatus, std::io::Error> {
//! #     Ok(OperationStatus::succeeded())
//! # }
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = WaitPolicy::new(Duration::from_secs(1), Duration::from_secs(15), Duration::from_secs(300))?;
//! let job = OperationReference::new("2b6b4a52-1f1c-4b4e-8a0b-0b27a5b9f8d1")?;
//! match wait(&job, fetch, policy).await? {
//!     WaitOutcome::Completed(_) => println!("done"),
//!     other => println!("not done: {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod backoff;
pub mod outcome;
pub mod policy;
pub mod reference;
pub mod status;
pub mod waiter;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use backoff::Backoff;
pub use outcome::{WaitError, WaitOutcome};
pub use policy::{PolicyError, WaitPolicy, DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_INTERVAL};
pub use reference::{OperationReference, ReferenceError};
pub use status::{HasOperationStatus, OperationState, OperationStatus};
pub use waiter::{wait, OperationWaiter};

pub use tokio_util::sync::CancellationToken;
