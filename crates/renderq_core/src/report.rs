use std::fmt;
use std::path::PathBuf;

use crate::ProgressSnapshot;

/// How a queued scene ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Done,
    Skipped { reason: String },
    Aborted { reason: String },
    /// The scene path did not exist; no context was created.
    Missing,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub scene: PathBuf,
    pub outcome: JobOutcome,
    pub last_progress: Option<ProgressSnapshot>,
    /// Failure that ended the background progress sampler early.
    pub progress_error: Option<String>,
}

impl JobReport {
    pub fn new(scene: impl Into<PathBuf>, outcome: JobOutcome) -> Self {
        Self {
            scene: scene.into(),
            outcome,
            last_progress: None,
            progress_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueueReport {
    pub jobs: Vec<JobReport>,
    /// Set once an operator abort stopped the queue.
    pub abort_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueTally {
    pub done: usize,
    pub skipped: usize,
    pub aborted: usize,
    pub missing: usize,
    pub failed: usize,
}

impl QueueReport {
    pub fn push(&mut self, report: JobReport) {
        self.jobs.push(report);
    }

    pub fn aborted(&self) -> bool {
        self.abort_reason.is_some()
    }

    pub fn tally(&self) -> QueueTally {
        let mut tally = QueueTally::default();
        for job in &self.jobs {
            match job.outcome {
                JobOutcome::Done => tally.done += 1,
                JobOutcome::Skipped { .. } => tally.skipped += 1,
                JobOutcome::Aborted { .. } => tally.aborted += 1,
                JobOutcome::Missing => tally.missing += 1,
                JobOutcome::Failed { .. } => tally.failed += 1,
            }
        }
        tally
    }
}

impl fmt::Display for QueueTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rendered, {} skipped, {} aborted, {} missing, {} failed",
            self.done, self.skipped, self.aborted, self.missing, self.failed
        )
    }
}
