//! Scheduler layer
//!
//! Runs independent per-project and per-environment tasks concurrently,
//! bounded by a worker limit, and waits for all of them.

pub mod pool;

pub use pool::WorkerPool;
