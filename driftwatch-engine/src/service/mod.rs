//! Service layer
//!
//! Services contain the per-entity logic of a run. They orchestrate
//! repository calls and hand the responses to the pure helpers of
//! `driftwatch-core`.

mod correlator;
mod resolver;

pub use correlator::Correlator;
pub use resolver::ImageResolver;
