//! Data Transfer Objects for upstream responses
//!
//! Wire shapes that cannot be deserialized straight into domain types.

pub mod cloud_run;
