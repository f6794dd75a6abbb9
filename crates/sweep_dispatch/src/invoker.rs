//! External simulator invocation.
//!
//! The production invoker shells out to an ns-3 style `waf` build tool with a
//! discrete argument vector, interpolating the swept value and the RNG run
//! number into waf's command template. Keeping the arguments as a vector
//! avoids the quoting and injection hazards of a single shell string.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use sweep_core::WorkItem;

const DEFAULT_BUILD_TOOL: &str = "./waf";
const DEFAULT_RUN_TARGET: &str = "scratch/v2x-analysis";

/// Seam between the dispatcher and the external world.
///
/// Implementations must be callable from multiple pool threads at once.
pub trait SimulationInvoker: Sync {
    /// Run one work item to completion and report how it ended.
    fn invoke(&self, item: &WorkItem) -> Result<(), InvokeError>;
}

/// Invoker backed by the waf build tool.
#[derive(Debug, Clone)]
pub struct WafInvoker {
    program: PathBuf,
    run_target: String,
}

impl WafInvoker {
    /// Create an invoker for the given build tool binary and run target
    /// (e.g. `./waf` and `scratch/v2x-analysis`).
    pub fn new(program: impl Into<PathBuf>, run_target: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            run_target: run_target.into(),
        }
    }

    /// Argument vector for one work item.
    ///
    /// The swept value travels as `totalData` and the repetition index as
    /// `RngRun`; the run index stays local to the dispatcher.
    fn argv(&self, item: &WorkItem) -> Vec<OsString> {
        vec![
            OsString::from(format!(
                "--command-template=%s --totalData={} --RngRun={}",
                item.configuration_value, item.repetition_index
            )),
            OsString::from("--run"),
            OsString::from(&self.run_target),
        ]
    }
}

impl Default for WafInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_TOOL, DEFAULT_RUN_TARGET)
    }
}

impl SimulationInvoker for WafInvoker {
    fn invoke(&self, item: &WorkItem) -> Result<(), InvokeError> {
        let status = Command::new(&self.program)
            .args(self.argv(item))
            .status()
            .map_err(InvokeError::Spawn)?;

        if status.success() {
            Ok(())
        } else {
            Err(InvokeError::Failed(status))
        }
    }
}

/// A single invocation that could not be started or ended unsuccessfully.
#[derive(Debug)]
pub enum InvokeError {
    Spawn(io::Error),
    Failed(ExitStatus),
}

impl std::fmt::Display for InvokeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvokeError::Spawn(error) => write!(f, "failed to start simulator: {error}"),
            InvokeError::Failed(status) => write!(f, "simulator exited unsuccessfully: {status}"),
        }
    }
}

impl std::error::Error for InvokeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InvokeError::Spawn(error) => Some(error),
            InvokeError::Failed(_) => None,
        }
    }
}
