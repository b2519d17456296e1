//! Core domain types
//!
//! These types mirror the entities returned by the source-control host and
//! the compute platform, plus the reconciled records produced from them.
//! They are rebuilt from live API responses on every run.

pub mod pipeline;
pub mod project;
pub mod service;
pub mod status;
pub mod tag;
