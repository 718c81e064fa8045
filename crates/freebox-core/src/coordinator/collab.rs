//! Collaborators the coordinator talks to. Each is a narrow trait so tests
//! can substitute scripted fakes for curl and the server.

use std::time::Duration;

use crate::batch::UploadTask;
use crate::transport::TransportError;

/// Event reported by a transport for one submitted task.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Bytes sent so far. `total == 0` means the size is not known yet.
    Progress { index: usize, loaded: u64, total: u64 },
    /// Terminal: the server accepted the file.
    Succeeded { index: usize, file_id: Option<i64> },
    /// Terminal: the upload failed; `reason` is shown to the user.
    Failed { index: usize, reason: String },
}

impl TransportEvent {
    pub fn index(&self) -> usize {
        match self {
            TransportEvent::Progress { index, .. }
            | TransportEvent::Succeeded { index, .. }
            | TransportEvent::Failed { index, .. } => *index,
        }
    }
}

/// Upload primitive. `submit` starts a transfer without blocking; `poll`
/// drives transfers and returns what happened since the last call. Every
/// accepted submission eventually yields exactly one terminal event, unless
/// it is aborted first.
pub trait Transport {
    fn submit(&mut self, task: &UploadTask) -> Result<(), TransportError>;

    fn poll(&mut self, timeout: Duration) -> Result<Vec<TransportEvent>, TransportError>;

    /// Stop the transfer for `index` and forget it. No events follow for it.
    /// Unknown indices are ignored.
    fn abort(&mut self, index: usize);
}

/// Source of the server's recommended concurrency. `Ok(None)` means the
/// server gave no hint; errors are recovered by the caller.
pub trait ConcurrencyHint {
    fn recommended_concurrency(&mut self) -> anyhow::Result<Option<usize>>;
}

impl<F> ConcurrencyHint for F
where
    F: FnMut() -> anyhow::Result<Option<usize>>,
{
    fn recommended_concurrency(&mut self) -> anyhow::Result<Option<usize>> {
        self()
    }
}

/// Always uses the configured default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHint;

impl ConcurrencyHint for NoHint {
    fn recommended_concurrency(&mut self) -> anyhow::Result<Option<usize>> {
        Ok(None)
    }
}

/// Receives human-readable failure messages. Must not block.
pub trait ErrorReporter {
    fn report(&mut self, message: &str);
}

impl<F> ErrorReporter for F
where
    F: FnMut(&str),
{
    fn report(&mut self, message: &str) {
        self(message)
    }
}

/// Fire-and-forget "the file set changed" signal, sent once per finished batch.
pub trait NotificationSink {
    fn files_changed(&mut self);
}

impl<F> NotificationSink for F
where
    F: FnMut(),
{
    fn files_changed(&mut self) {
        self()
    }
}
