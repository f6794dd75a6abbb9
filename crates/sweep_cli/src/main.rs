//! `parallel` — dispatch a simulation parameter sweep across a bounded pool.
//!
//! Usage: `parallel <max_data> <step> <sub_runs> <processes>`. The sweep
//! enumerates totalData values `0, step, ..` up to the closed bound, runs
//! `sub_runs` repetitions of each through the waf build tool, and never keeps
//! more than `processes` simulator invocations in flight.

use std::process::exit;

use clap::error::ErrorKind;
use clap::Parser;
use sweep_core::{stable_plan_json, SweepPlan};
use sweep_dispatch::{dispatch_all, WafInvoker};

#[derive(Parser)]
#[command(
    name = "parallel",
    about = "Dispatch a v2x simulation parameter sweep across a bounded worker pool"
)]
struct Cli {
    /// Largest totalData value included in the sweep
    max_data: u64,
    /// Increment between consecutive totalData values
    step: u64,
    /// Repetitions per totalData value, each with its own RNG run
    sub_runs: usize,
    /// Maximum number of simulator invocations in flight
    processes: usize,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => match error.kind() {
            // the historical sweep driver printed usage and exited 0 on a
            // wrong argument count; that contract is kept
            ErrorKind::MissingRequiredArgument
            | ErrorKind::UnknownArgument
            | ErrorKind::TooManyValues => {
                let _ = error.print();
                exit(0);
            }
            _ => error.exit(),
        },
    };

    let plan = match SweepPlan::new(cli.max_data, cli.step, cli.sub_runs) {
        Ok(plan) => plan,
        Err(error) => {
            eprintln!("error: {error}");
            exit(2);
        }
    };

    eprintln!("plan: {}", stable_plan_json(&plan));

    let items = plan.work_items();
    let report = match dispatch_all(&WafInvoker::default(), &items, cli.processes) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("error: {error}");
            exit(2);
        }
    };

    // individual simulator failures are fire-and-forget: report them, exit 0
    eprintln!(
        "sweep finished: {} succeeded, {} failed (of {})",
        report.succeeded,
        report.failed,
        plan.total_items()
    );
}
