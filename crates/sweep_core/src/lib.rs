//! Shared sweep domain primitives.
//!
//! This crate owns the deterministic enumeration of a parameter sweep: the
//! validated sweep plan and the ordered work-item list derived from it. It
//! intentionally excludes process execution and pool concerns, which live in
//! `sweep_dispatch`.

pub mod plan;

pub use plan::{stable_plan_json, SweepPlan, ValidationError, WorkItem};
