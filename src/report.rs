//! Outcome types shared by the compile and snapshot phases.
//!
//! Every task ends in exactly one [`TaskStatus`]. A failed task never stops
//! its siblings; the phase collects all results and the CLI turns any
//! failure into a non-zero exit.

use std::fmt;

/// Outcome of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// The artifact was (re)written.
    Built,
    /// The artifact was already newer than its inputs.
    UpToDate,
    /// The tool failed; the previous artifact, if any, is untouched.
    Failed(String),
}

impl TaskStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed(_))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Built => write!(f, "built"),
            TaskStatus::UpToDate => write!(f, "up to date"),
            TaskStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of one task, keyed by target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub target: String,
    pub status: TaskStatus,
}

/// All task results of one phase, in target order.
#[derive(Debug, Clone, Default)]
pub struct PhaseReport {
    pub results: Vec<TaskResult>,
    /// Targets excluded before scheduling (snapshots disabled for the site).
    pub disabled: usize,
}

impl PhaseReport {
    pub fn built(&self) -> usize {
        self.count(|s| matches!(s, TaskStatus::Built))
    }

    pub fn up_to_date(&self) -> usize {
        self.count(|s| matches!(s, TaskStatus::UpToDate))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|r| match &r.status {
            TaskStatus::Failed(err) => Some((r.target.as_str(), err.as_str())),
            _ => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.count(TaskStatus::is_failure)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&TaskStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} built, {} up to date", self.built(), self.up_to_date())?;
        if self.disabled > 0 {
            write!(f, ", {} disabled", self.disabled)?;
        }
        if self.failed() > 0 {
            write!(f, ", {} failed", self.failed())?;
        }
        Ok(())
    }
}
