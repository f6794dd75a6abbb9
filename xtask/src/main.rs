use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the sweep dispatcher workspace",
    long_about = "A unified CLI for running sweeps and CI checks\n\
                  in the sweep dispatcher workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci,
    /// Run a parameter sweep through the `parallel` binary
    Sweep {
        /// Largest totalData value included in the sweep
        max_data: u64,
        /// Increment between consecutive totalData values
        step: u64,
        /// Repetitions per totalData value
        sub_runs: u64,
        /// Maximum number of simulator invocations in flight
        processes: u64,
    },
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test sweep_core");
    run_cargo(&["test", "-p", "sweep_core"]);

    step("Test sweep_dispatch");
    run_cargo(&["test", "-p", "sweep_dispatch"]);

    step("Test sweep_cli");
    run_cargo(&["test", "-p", "sweep_cli"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => {
            ci_check();
            eprintln!("\nCI job passed.");
        }
        Commands::Sweep {
            max_data,
            step: sweep_step,
            sub_runs,
            processes,
        } => {
            let forwarded = [
                max_data.to_string(),
                sweep_step.to_string(),
                sub_runs.to_string(),
                processes.to_string(),
            ];
            run_cargo(&[
                "run",
                "-p",
                "sweep_cli",
                "--release",
                "--",
                &forwarded[0],
                &forwarded[1],
                &forwarded[2],
                &forwarded[3],
            ]);
        }
    }
}
