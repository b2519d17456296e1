//! Driftwatch Core
//!
//! Core types and pure logic for reconciling released versions against
//! deployed versions.
//!
//! This crate contains:
//! - Domain types: source-control and compute entities (Project, Tag, Pipeline, Job, ...)
//! - DTOs: wire shapes of upstream responses that need pre-processing
//! - Correlation helpers: tag to pipeline to deploy-job matching
//! - Image normalization: configurable naming-convention rules
//! - Reconciliation: the join producing one `VersionStatus` per project
//! - Report: the JSON artifact format

pub mod collision;
pub mod correlate;
pub mod domain;
pub mod dto;
pub mod normalize;
pub mod reconcile;
pub mod report;
