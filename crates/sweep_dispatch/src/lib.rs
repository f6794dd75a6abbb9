//! Bounded execution of a sweep work list.
//!
//! This crate drains the work items produced by `sweep_core` through a
//! fixed-size worker pool, running one blocking external simulator invocation
//! per item. The pool never exceeds the requested worker count and the
//! dispatch call returns only after every item has finished.
//!
//! There is no timeout and no cancellation path: an invocation that never
//! terminates holds its pool slot indefinitely, reducing effective
//! concurrency by one.

pub mod dispatcher;
pub mod invoker;

pub use dispatcher::{dispatch_all, dispatch_all_with_progress, DispatchError, DispatchReport};
pub use invoker::{InvokeError, SimulationInvoker, WafInvoker};
