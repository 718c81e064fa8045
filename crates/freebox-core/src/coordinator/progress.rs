//! Aggregate progress published while a batch runs, and the final report.

use crate::batch::{TaskState, UploadTask};

/// Snapshot of batch progress (CLI-friendly).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchProgress {
    /// Mean of per-task progress, in [0, 100].
    pub percent: f64,
    pub total: usize,
    pub pending: usize,
    pub in_flight: usize,
    pub done: usize,
    pub failed: usize,
    /// Display name of the task that reported most recently.
    pub current: Option<String>,
    /// Set on the last snapshot of a batch.
    pub finished: bool,
}

impl BatchProgress {
    pub fn from_tasks(tasks: &[UploadTask], current: Option<usize>, finished: bool) -> Self {
        let mut snap = BatchProgress {
            percent: aggregate_percent(tasks),
            total: tasks.len(),
            pending: 0,
            in_flight: 0,
            done: 0,
            failed: 0,
            current: current
                .and_then(|i| tasks.get(i))
                .map(|t| t.display_name().to_string()),
            finished,
        };
        for t in tasks {
            match t.state() {
                TaskState::Pending => snap.pending += 1,
                TaskState::InFlight => snap.in_flight += 1,
                TaskState::Done => snap.done += 1,
                TaskState::Failed => snap.failed += 1,
            }
        }
        snap
    }

    /// Tasks that reached Done or Failed.
    pub fn completed(&self) -> usize {
        self.done + self.failed
    }
}

/// Arithmetic mean of per-task progress. Pending tasks count as 0, Done as 100,
/// Failed keep their last value. An empty slice is 0.
pub fn aggregate_percent(tasks: &[UploadTask]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let sum: f64 = tasks.iter().map(|t| t.progress()).sum();
    (sum / tasks.len() as f64).clamp(0.0, 100.0)
}

/// A task that finished Done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub index: usize,
    pub name: String,
    pub file_id: Option<i64>,
}

/// A task that finished Failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    pub index: usize,
    pub name: String,
    pub reason: String,
}

/// Outcome of a finished batch, in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub uploaded: Vec<UploadedFile>,
    pub failed: Vec<FailedUpload>,
}

impl BatchReport {
    pub(crate) fn from_tasks(tasks: &[UploadTask]) -> Self {
        let mut report = BatchReport::default();
        for t in tasks {
            match t.state() {
                TaskState::Done => report.uploaded.push(UploadedFile {
                    index: t.index(),
                    name: t.display_name().to_string(),
                    file_id: t.file_id(),
                }),
                TaskState::Failed => report.failed.push(FailedUpload {
                    index: t.index(),
                    name: t.display_name().to_string(),
                    reason: t.failure.clone().unwrap_or_default(),
                }),
                TaskState::Pending | TaskState::InFlight => {}
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{Batch, LocalFile};

    fn tasks(n: usize) -> Vec<UploadTask> {
        (0..n)
            .map(|i| LocalFile::new(format!("/f/{i}"), format!("f{i}.bin"), 100))
            .collect::<Batch>()
            .into_tasks()
    }

    #[test]
    fn aggregate_is_mean_of_tasks() {
        let mut t = tasks(4);
        t[0].progress = 100.0;
        t[0].state = TaskState::Done;
        t[1].progress = 50.0;
        t[1].state = TaskState::InFlight;
        t[2].progress = 30.0;
        t[2].state = TaskState::Failed;
        assert!((aggregate_percent(&t) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_of_empty_is_zero() {
        assert_eq!(aggregate_percent(&[]), 0.0);
    }

    #[test]
    fn snapshot_counts_states() {
        let mut t = tasks(5);
        t[0].state = TaskState::Done;
        t[0].progress = 100.0;
        t[1].state = TaskState::InFlight;
        t[2].state = TaskState::Failed;
        let snap = BatchProgress::from_tasks(&t, Some(1), false);
        assert_eq!(snap.total, 5);
        assert_eq!(snap.done, 1);
        assert_eq!(snap.in_flight, 1);
        assert_eq!(snap.failed, 1);
        assert_eq!(snap.pending, 2);
        assert_eq!(snap.completed(), 2);
        assert_eq!(snap.current.as_deref(), Some("f1.bin"));
        assert!((snap.percent - 20.0).abs() < 1e-9);
    }
}
