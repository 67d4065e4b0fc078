//! Algorithm implementations
//!
//! The baseline resolver and the AKI stager are pure per-encounter
//! functions; the pipeline module runs them over a cohort.

pub mod baseline;
pub mod pipeline;
pub mod staging;
