//! # cf-client – Cloud Foundry Cloud Controller client
//!
//! Typed access to the parts of the Cloud Controller v2 and v3 APIs that
//! start or report on asynchronous work: jobs, service instances, builds,
//! packages, and the applications, organizations, spaces and routes whose
//! deletion runs as a job.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Service clients                                 │
//! │  JobsClient · ServiceInstancesClient             │
//! │  BuildsClient · PackagesClient                   │
//! │  ApplicationsClient · OrganizationsClient        │
//! │  SpacesClient · RoutesClient                     │
//! ├──────────────────────────────────────────────────┤
//! │  CfClient  (client.rs)                           │
//! │  ├── get / post / put / patch / delete / upload  │
//! │  ├── paginate / collect_all  (pagination.rs)     │
//! │  └── transient retry with backoff                │
//! ├──────────────────────────────────────────────────┤
//! │  TokenProvider  (auth.rs)                        │
//! │  └── StaticToken · ClientCredentialsTokenProvider│
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Status mapping
//!
//! Each polled resource implements [`cf_waiter::HasOperationStatus`]:
//!
//! | Resource              | Pending           | Running                       | Succeeded  | Failed             |
//! |-----------------------|-------------------|-------------------------------|------------|--------------------|
//! | v2 job                | `queued`          | `running`                     | `finished` | `failed`           |
//! | v3 job                |                   | `PROCESSING`, `POLLING`       | `COMPLETE` | `FAILED`           |
//! | service last_operation|                   | `in progress`                 | `succeeded`| `failed`           |
//! | build                 |                   | `STAGING`                     | `STAGED`   | `FAILED`           |
//! | package               | `AWAITING_UPLOAD` | `PROCESSING_UPLOAD`, `COPYING`| `READY`    | `FAILED`, `EXPIRED`|
//!
//! Any other state reads as running, with the raw state as progress hint.

// ── Sub-modules ─────────────────────────────────────────────────────────

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod pagination;

// Service clients
pub mod applications;
pub mod builds;
pub mod jobs;
pub mod organizations;
pub mod packages;
pub mod routes;
pub mod service_instances;
pub mod spaces;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use auth::{ClientCredentialsTokenProvider, StaticToken, TokenProvider};
pub use client::{CfClient, CfResponse};
pub use config::{CfConnectionConfig, RetryConfig};
pub use error::{CfError, CfResult};
pub use pagination::{collect_all, paginate, Page, V2Page, V2Resource, V3Page};

pub use applications::{Application, ApplicationsClient};
pub use builds::{Build, BuildsClient};
pub use jobs::{job_reference_from_location, JobsClient, V2Job, V3Job};
pub use organizations::{Organization, OrganizationsClient};
pub use packages::{Package, PackagesClient};
pub use routes::{Route, RoutesClient};
pub use service_instances::{
    CreateServiceInstanceRequest, LastOperation, ServiceInstance, ServiceInstanceDeletion,
    ServiceInstancesClient,
};
pub use spaces::{Space, SpacesClient};
