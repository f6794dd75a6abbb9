//! Fixed-size pool drain over the work list.
//!
//! Mirrors the fire-and-forget semantics of the original sweep driver: a
//! failing invocation is reported and counted, never fatal, and the batch
//! call returns only once every item has run.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use sweep_core::WorkItem;

use crate::invoker::SimulationInvoker;

/// Outcome counts for one drained batch. Failed items still occupied a pool
/// slot to completion, so `succeeded + failed` equals the batch size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Dispatch-level misconfiguration, detected before any invocation starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// `processes` was 0. rayon would treat that as "pick a default thread
    /// count", silently breaking the concurrency bound, so it is refused.
    ZeroWorkers,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::ZeroWorkers => f.write_str("processes must be a positive integer"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Run every work item through `invoker`, at most `processes` at a time,
/// with a progress bar.
///
/// Blocks until the whole batch has drained. Per-item failures are reported
/// on stderr and tallied in the returned report; they never abort the batch.
pub fn dispatch_all<I>(
    invoker: &I,
    items: &[WorkItem],
    processes: usize,
) -> Result<DispatchReport, DispatchError>
where
    I: SimulationInvoker + ?Sized,
{
    dispatch_all_with_progress(invoker, items, processes, true)
}

/// Same as [`dispatch_all`] with the progress bar switchable, for tests and
/// quiet environments.
pub fn dispatch_all_with_progress<I>(
    invoker: &I,
    items: &[WorkItem],
    processes: usize,
    show_progress: bool,
) -> Result<DispatchReport, DispatchError>
where
    I: SimulationInvoker + ?Sized,
{
    if processes == 0 {
        return Err(DispatchError::ZeroWorkers);
    }

    let total = items.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(processes)
        .build()
        .expect("Failed to create thread pool");

    let pb_clone = pb.clone();
    let failed = pool.install(|| {
        items
            .par_iter()
            .map(|item| {
                let outcome = invoker.invoke(item);
                if let Err(error) = &outcome {
                    let line = format!(
                        "run {} repetition {} (totalData={}): {error}",
                        item.run_index, item.repetition_index, item.configuration_value
                    );
                    match &pb_clone {
                        Some(bar) => bar.println(line),
                        None => eprintln!("{line}"),
                    }
                }
                if let Some(bar) = &pb_clone {
                    bar.inc(1);
                }
                usize::from(outcome.is_err())
            })
            .sum::<usize>()
    });

    if let Some(bar) = &pb {
        bar.finish_with_message("Completed");
    }

    Ok(DispatchReport {
        succeeded: total - failed,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use sweep_core::SweepPlan;

    use super::*;
    use crate::invoker::InvokeError;

    /// Fake invoker that records concurrency and completion bookkeeping.
    #[derive(Default)]
    struct RecordingInvoker {
        active: AtomicUsize,
        high_water: AtomicUsize,
        started: AtomicUsize,
        finished: AtomicUsize,
        fail_even_configurations: bool,
    }

    impl RecordingInvoker {
        fn failing_on_even_configurations() -> Self {
            Self {
                fail_even_configurations: true,
                ..Self::default()
            }
        }
    }

    impl SimulationInvoker for RecordingInvoker {
        fn invoke(&self, item: &WorkItem) -> Result<(), InvokeError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.high_water.fetch_max(now_active, Ordering::SeqCst);

            // hold the slot long enough for other workers to pile up
            thread::sleep(Duration::from_millis(5));

            self.active.fetch_sub(1, Ordering::SeqCst);
            self.finished.fetch_add(1, Ordering::SeqCst);

            if self.fail_even_configurations && item.configuration_value % 2 == 0 {
                Err(InvokeError::Spawn(std::io::Error::other("injected")))
            } else {
                Ok(())
            }
        }
    }

    fn items_for(max_data: u64, step: u64, sub_runs: usize) -> Vec<WorkItem> {
        SweepPlan::new(max_data, step, sub_runs)
            .expect("plan should pass")
            .work_items()
    }

    #[test]
    fn never_exceeds_the_concurrency_bound() {
        let items = items_for(5, 1, 2);
        assert_eq!(items.len(), 12);

        let invoker = RecordingInvoker::default();
        let report = dispatch_all_with_progress(&invoker, &items, 3, false)
            .expect("dispatch should succeed");

        assert_eq!(report.succeeded, 12);
        assert!(invoker.high_water.load(Ordering::SeqCst) <= 3);
        assert!(invoker.high_water.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn returns_only_after_every_item_started_and_finished() {
        let items = items_for(7, 2, 3);
        let invoker = RecordingInvoker::default();

        let report = dispatch_all_with_progress(&invoker, &items, 4, false)
            .expect("dispatch should succeed");

        assert_eq!(invoker.started.load(Ordering::SeqCst), items.len());
        assert_eq!(invoker.finished.load(Ordering::SeqCst), items.len());
        assert_eq!(report.succeeded + report.failed, items.len());
    }

    #[test]
    fn drains_an_empty_work_list() {
        let invoker = RecordingInvoker::default();
        let report =
            dispatch_all_with_progress(&invoker, &[], 2, false).expect("dispatch should succeed");

        assert_eq!(report, DispatchReport::default());
        assert_eq!(invoker.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn drains_a_single_item_with_a_single_worker() {
        let items = items_for(0, 1, 1);
        let invoker = RecordingInvoker::default();

        let report = dispatch_all_with_progress(&invoker, &items, 1, false)
            .expect("dispatch should succeed");

        assert_eq!(report.succeeded, 1);
        assert_eq!(invoker.high_water.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_are_counted_without_stopping_the_batch() {
        // configurations 0..=6: the four even ones fail, the three odd ones pass
        let items = items_for(6, 1, 1);
        let invoker = RecordingInvoker::failing_on_even_configurations();

        let report = dispatch_all_with_progress(&invoker, &items, 2, false)
            .expect("dispatch should succeed");

        assert_eq!(invoker.finished.load(Ordering::SeqCst), items.len());
        assert_eq!(report.failed, 4);
        assert_eq!(report.succeeded, 3);
    }

    #[test]
    fn more_workers_than_items_still_drains() {
        let items = items_for(1, 1, 1);
        let invoker = RecordingInvoker::default();

        let report = dispatch_all_with_progress(&invoker, &items, 8, false)
            .expect("dispatch should succeed");

        assert_eq!(report.succeeded, items.len());
        assert!(invoker.high_water.load(Ordering::SeqCst) <= items.len());
    }

    #[test]
    fn rejects_zero_workers_before_any_invocation() {
        let items = items_for(3, 1, 1);
        let invoker = RecordingInvoker::default();

        let error = dispatch_all_with_progress(&invoker, &items, 0, false)
            .expect_err("zero workers should fail");

        assert_eq!(error, DispatchError::ZeroWorkers);
        assert_eq!(invoker.started.load(Ordering::SeqCst), 0);
    }
}
