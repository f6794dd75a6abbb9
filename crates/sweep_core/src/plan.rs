use serde::{Deserialize, Serialize};

/// One unit of dispatch: a single external simulator execution.
///
/// `run_index` groups all repetitions of one configuration value and is never
/// handed to the simulator; `repetition_index` maps to the simulator's RNG
/// run number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    pub run_index: usize,
    pub repetition_index: usize,
    pub configuration_value: u64,
}

/// Validated sweep parameters plus the counts derived from them.
///
/// Construction is the only validation point; a `SweepPlan` that exists can
/// always be enumerated.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SweepPlan {
    max_data: u64,
    step: u64,
    sub_runs: usize,
    distinct_configurations: usize,
    total_items: usize,
}

impl SweepPlan {
    /// Validate the raw sweep parameters and derive the plan.
    ///
    /// The configuration cursor walks `0, step, 2*step, ...` while it stays
    /// strictly below `max_data + step`, so the sweep always includes 0 and
    /// the largest multiple of `step` not exceeding that bound.
    pub fn new(max_data: u64, step: u64, sub_runs: usize) -> Result<Self, ValidationError> {
        if step == 0 {
            return Err(ValidationError::new("step must be a positive integer"));
        }

        if sub_runs == 0 {
            return Err(ValidationError::new("sub_runs must be a positive integer"));
        }

        let bound = max_data.checked_add(step).ok_or_else(|| {
            ValidationError::new("max_data + step exceeds the representable range")
        })?;

        let distinct_configurations = usize::try_from(bound.div_ceil(step)).map_err(|_| {
            ValidationError::new("Sweep produces more configurations than addressable")
        })?;

        let total_items = distinct_configurations
            .checked_mul(sub_runs)
            .ok_or_else(|| ValidationError::new("Sweep produces more work items than addressable"))?;

        Ok(Self {
            max_data,
            step,
            sub_runs,
            distinct_configurations,
            total_items,
        })
    }

    pub fn max_data(&self) -> u64 {
        self.max_data
    }

    pub fn step(&self) -> u64 {
        self.step
    }

    pub fn sub_runs(&self) -> usize {
        self.sub_runs
    }

    /// Number of distinct configuration values the sweep visits.
    pub fn distinct_configurations(&self) -> usize {
        self.distinct_configurations
    }

    /// Total number of work items, `distinct_configurations * sub_runs`.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Enumerate the full ordered work list.
    ///
    /// Deterministic for identical plans. Items are grouped by configuration
    /// value in ascending order; within a group, repetition indices run
    /// `1..=sub_runs`. `run_index` starts at 1 and advances once per group.
    pub fn work_items(&self) -> Vec<WorkItem> {
        let mut items = Vec::with_capacity(self.total_items);
        let bound = self.max_data + self.step;

        let mut cursor = 0u64;
        let mut run_index = 0usize;
        while cursor < bound {
            run_index += 1;
            for repetition_index in 1..=self.sub_runs {
                items.push(WorkItem {
                    run_index,
                    repetition_index,
                    configuration_value: cursor,
                });
            }
            cursor = match cursor.checked_add(self.step) {
                Some(next) => next,
                None => break,
            };
        }

        items
    }
}

/// Rejection of malformed sweep parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Stable JSON rendering for plan and work-item values.
pub fn stable_plan_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of plan value should not fail")
}
