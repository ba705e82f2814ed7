//! Ordered, failure-isolated deferred tasks.
//!
//! A [`TaskQueue`] runs its tasks one after another on the calling thread.
//! An error or panic in one task is logged and recorded in the
//! [`TaskReport`]; the remaining tasks still run.

use crate::metrics::StartupMetrics;
use anyhow::Result;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Log level used when a task fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureSeverity {
    Warning,
    Severe,
}

type TaskFn = Box<dyn FnOnce() -> Result<()> + Send>;

/// A named unit of best-effort work
pub struct DeferredTask {
    name: &'static str,
    severity: FailureSeverity,
    run: TaskFn,
}

impl DeferredTask {
    pub fn new<F>(name: &'static str, run: F) -> Self
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        Self {
            name,
            severity: FailureSeverity::Warning,
            run: Box::new(run),
        }
    }

    /// Log failures of this task at error level
    pub fn severe(mut self) -> Self {
        self.severity = FailureSeverity::Severe;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn severity(&self) -> FailureSeverity {
        self.severity
    }
}

impl std::fmt::Debug for DeferredTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredTask")
            .field("name", &self.name)
            .field("severity", &self.severity)
            .finish_non_exhaustive()
    }
}

/// How a task ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
    Panicked(String),
}

impl TaskOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskOutcome::Completed)
    }
}

/// Outcome of every task, in run order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskReport {
    pub outcomes: Vec<(&'static str, TaskOutcome)>,
}

impl TaskReport {
    pub fn outcome(&self, name: &str) -> Option<&TaskOutcome> {
        self.outcomes
            .iter()
            .find(|(task, _)| *task == name)
            .map(|(_, outcome)| outcome)
    }

    pub fn failed(&self) -> Vec<&'static str> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_completed())
            .map(|(name, _)| *name)
            .collect()
    }

    pub fn all_completed(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_completed())
    }
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    tasks: Vec<DeferredTask>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push(task);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tasks.iter().map(DeferredTask::name).collect()
    }

    /// Run every task in order
    pub fn run_all(self, metrics: &StartupMetrics) -> TaskReport {
        let mut report = TaskReport::default();

        for task in self.tasks {
            let DeferredTask {
                name,
                severity,
                run,
            } = task;

            tracing::debug!("Running deferred task {}", name);
            metrics.record_task_run();

            let outcome = match panic::catch_unwind(AssertUnwindSafe(run)) {
                Ok(Ok(())) => TaskOutcome::Completed,
                Ok(Err(e)) => TaskOutcome::Failed(format!("{:#}", e)),
                Err(payload) => TaskOutcome::Panicked(panic_message(payload.as_ref())),
            };

            match (&outcome, severity) {
                (TaskOutcome::Completed, _) => {}
                (TaskOutcome::Failed(message) | TaskOutcome::Panicked(message), FailureSeverity::Severe) => {
                    metrics.record_task_failed();
                    tracing::error!("Deferred task {} failed: {}", name, message);
                }
                (TaskOutcome::Failed(message) | TaskOutcome::Panicked(message), FailureSeverity::Warning) => {
                    metrics.record_task_failed();
                    tracing::warn!("Deferred task {} failed: {}", name, message);
                }
            }

            report.outcomes.push((name, outcome));
        }

        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
