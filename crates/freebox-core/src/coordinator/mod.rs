//! Upload coordinator: drives one batch with bounded parallelism.
//!
//! The coordinator owns the batch, the concurrency budget and the scan
//! cursor. Its entry points (`start_batch`, `on_progress`, `on_task_success`,
//! `on_task_failure`) are the only way task state changes. Transfers are
//! submitted to a [`Transport`]; their events are fed back through
//! [`UploadCoordinator::handle_event`] by the driver loop in `crate::upload`.
//!
//! Admission is strictly ascending by index. When a slot frees, the scan
//! resumes just past the task that freed it instead of restarting at 0.
//! Because every scan admits in order and stops only when the window is
//! full, Pending tasks always form a suffix of the batch, so resuming past
//! the finished task never skips one.

mod budget;
mod collab;
mod progress;


pub use budget::ConcurrencyBudget;
pub use collab::{
    ConcurrencyHint, ErrorReporter, NoHint, NotificationSink, Transport, TransportEvent,
};
pub use progress::{aggregate_percent, BatchProgress, BatchReport, FailedUpload, UploadedFile};

use crate::batch::{Batch, TaskState, UploadTask};

/// Batch-level lifecycle: Idle → Running → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Idle,
    Running,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("upload batch is empty")]
    EmptyBatch,
    #[error("an upload batch is already running")]
    AlreadyRunning,
}

pub struct UploadCoordinator<T> {
    transport: T,
    reporter: Box<dyn ErrorReporter + Send>,
    sink: Box<dyn NotificationSink + Send>,
    progress_tx: Option<tokio::sync::watch::Sender<BatchProgress>>,
    default_budget: ConcurrencyBudget,
    budget: ConcurrencyBudget,
    tasks: Vec<UploadTask>,
    in_flight: usize,
    /// Position where the last admission scan stopped.
    cursor: usize,
    state: BatchState,
    last_active: Option<usize>,
    report: Option<BatchReport>,
}

impl<T: Transport> UploadCoordinator<T> {
    pub fn new(
        transport: T,
        default_budget: ConcurrencyBudget,
        reporter: Box<dyn ErrorReporter + Send>,
        sink: Box<dyn NotificationSink + Send>,
    ) -> Self {
        Self {
            transport,
            reporter,
            sink,
            progress_tx: None,
            default_budget,
            budget: default_budget,
            tasks: Vec::new(),
            in_flight: 0,
            cursor: 0,
            state: BatchState::Idle,
            last_active: None,
            report: None,
        }
    }

    /// Publish aggregate progress on `tx`. Readers always see the latest
    /// snapshot; the last one of a batch has `finished` set.
    pub fn with_progress(mut self, tx: tokio::sync::watch::Sender<BatchProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Start uploading `batch`. Queries `hint` for the window size (falling back
    /// to the default on error or no value), then admits the first wave and
    /// returns without waiting for any transfer.
    pub fn start_batch(
        &mut self,
        batch: Batch,
        hint: &mut dyn ConcurrencyHint,
    ) -> Result<(), CoordinatorError> {
        if self.state == BatchState::Running {
            return Err(CoordinatorError::AlreadyRunning);
        }
        if batch.is_empty() {
            return Err(CoordinatorError::EmptyBatch);
        }

        let recommended = match hint.recommended_concurrency() {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("concurrency hint unavailable, using default: {:#}", e);
                None
            }
        };
        self.budget = ConcurrencyBudget::from_hint(recommended, self.default_budget);
        self.tasks = batch.into_tasks();
        self.in_flight = 0;
        self.cursor = 0;
        self.last_active = None;
        self.report = None;
        self.state = BatchState::Running;
        tracing::info!(
            tasks = self.tasks.len(),
            budget = self.budget.get(),
            "upload batch started"
        );

        self.admit_next(0);
        self.publish(false);
        self.finish_if_drained();
        Ok(())
    }

    /// Scan forward from `cursor`, submitting Pending tasks until the queue ends
    /// or the window is full. A no-op when idle, when the window is full, or
    /// when nothing at or after `cursor` is Pending.
    pub fn admit_next(&mut self, cursor: usize) {
        if self.state != BatchState::Running {
            return;
        }
        let mut i = cursor;
        while i < self.tasks.len() && self.budget.available(self.in_flight) > 0 {
            if self.tasks[i].state == TaskState::Pending {
                match self.transport.submit(&self.tasks[i]) {
                    Ok(()) => {
                        self.tasks[i].state = TaskState::InFlight;
                        self.in_flight += 1;
                        tracing::debug!(
                            index = i,
                            in_flight = self.in_flight,
                            "admitted {}",
                            self.tasks[i].display_name()
                        );
                    }
                    Err(e) => {
                        // Rejected before going in flight: the slot stays free.
                        self.fail_task(i, &e.to_string());
                    }
                }
            }
            i += 1;
        }
        self.cursor = i;
    }

    /// Byte progress for one task. Ignored unless the task is in flight; an
    /// unknown total (`0`) keeps the last reported value.
    pub fn on_progress(&mut self, index: usize, loaded: u64, total: u64) {
        let Some(task) = self.tasks.get_mut(index) else {
            return;
        };
        if task.state != TaskState::InFlight {
            return;
        }
        if total > 0 {
            task.progress = (loaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0);
        }
        self.last_active = Some(index);
        self.publish(false);
    }

    pub fn on_task_success(&mut self, index: usize, file_id: Option<i64>) {
        if !self.take_in_flight(index, "success") {
            return;
        }
        let task = &mut self.tasks[index];
        task.state = TaskState::Done;
        task.progress = 100.0;
        task.file_id = file_id;
        tracing::info!(index, ?file_id, "uploaded {}", task.display_name());

        self.admit_next(index + 1);
        self.publish(false);
        self.finish_if_drained();
    }

    /// Terminal failure for one task. Reported once; the batch continues and
    /// the task is not retried.
    pub fn on_task_failure(&mut self, index: usize, reason: &str) {
        if !self.take_in_flight(index, "failure") {
            return;
        }
        self.fail_task(index, reason);

        self.admit_next(index + 1);
        self.publish(false);
        self.finish_if_drained();
    }

    /// Abort every in-flight transfer and fail its task with `reason`. For a
    /// broken transport: all stuck transfers are dropped before any freed
    /// slot admits the next task.
    pub fn abort_in_flight(&mut self, reason: &str) {
        let stuck: Vec<usize> = self
            .tasks
            .iter()
            .filter(|t| t.state == TaskState::InFlight)
            .map(|t| t.index())
            .collect();
        for &index in &stuck {
            self.transport.abort(index);
        }
        for index in stuck {
            self.on_task_failure(index, reason);
        }
    }

    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Progress { index, loaded, total } => {
                self.on_progress(index, loaded, total)
            }
            TransportEvent::Succeeded { index, file_id } => self.on_task_success(index, file_id),
            TransportEvent::Failed { index, reason } => self.on_task_failure(index, &reason),
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == BatchState::Running
    }

    pub fn budget(&self) -> ConcurrencyBudget {
        self.budget
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Tasks of the running batch; empty when idle.
    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn progress(&self) -> BatchProgress {
        BatchProgress::from_tasks(&self.tasks, self.last_active, false)
    }

    /// Report of the last finished batch, if not taken yet.
    pub fn take_report(&mut self) -> Option<BatchReport> {
        self.report.take()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Release the slot held by `index`. Returns false (and changes nothing)
    /// for unknown indices or tasks not in flight.
    fn take_in_flight(&mut self, index: usize, what: &str) -> bool {
        match self.tasks.get(index).map(|t| t.state) {
            Some(TaskState::InFlight) => {
                self.in_flight -= 1;
                self.last_active = Some(index);
                true
            }
            state => {
                tracing::warn!(index, ?state, "ignoring {} for task not in flight", what);
                false
            }
        }
    }

    fn fail_task(&mut self, index: usize, reason: &str) {
        let task = &mut self.tasks[index];
        task.state = TaskState::Failed;
        task.failure = Some(reason.to_string());
        let message = format!("Failed to upload {}: {}", task.display_name(), reason);
        tracing::warn!(index, "{}", message);
        self.reporter.report(&message);
    }

    fn finish_if_drained(&mut self) {
        if self.state == BatchState::Running && self.tasks.iter().all(|t| t.state.is_terminal()) {
            self.finish_batch();
        }
    }

    /// Every task is terminal: publish the final snapshot, signal the sink,
    /// keep the report and clear the batch.
    fn finish_batch(&mut self) {
        self.publish(true);
        let report = BatchReport::from_tasks(&self.tasks);
        tracing::info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "upload batch finished"
        );
        self.sink.files_changed();
        self.report = Some(report);
        self.tasks.clear();
        self.in_flight = 0;
        self.cursor = 0;
        self.last_active = None;
        self.state = BatchState::Idle;
    }

    fn publish(&self, finished: bool) {
        if let Some(ref tx) = self.progress_tx {
            // Stored even with no receiver attached yet.
            tx.send_replace(BatchProgress::from_tasks(
                &self.tasks,
                self.last_active,
                finished,
            ));
        }
    }
}
