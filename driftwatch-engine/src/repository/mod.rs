//! Repository layer
//!
//! Repositories abstract communication with the upstream systems. They
//! provide simple, focused interfaces without any correlation logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod compute;
mod source_control;

// Re-export traits
pub use compute::ComputeRepository;
pub use source_control::SourceControlRepository;

// Re-export implementations
pub use compute::HttpComputeRepository;
pub use source_control::HttpSourceControlRepository;
