//! Driftwatch Engine
//!
//! Drives a reconciliation run against live upstream systems.
//!
//! Architecture:
//! - Repositories: trait-based access to the source-control host and the compute platform
//! - Services: tag/pipeline/job correlation and deployed-image resolution
//! - Scheduler: bounded worker pool with per-task deadlines
//! - Run: fans work out, waits for every task, then reconciles
//!
//! Every upstream call is bounded by a timeout and retried with backoff
//! when the failure is transient. A failing project or environment degrades
//! to unresolved fields; the run itself always completes.

pub mod config;
pub mod repository;
pub mod retry;
pub mod run;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{EngineConfig, EnvironmentTarget};
pub use run::VersionRun;
