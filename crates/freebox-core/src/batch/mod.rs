//! Upload batch data model.
//!
//! A [`Batch`] is the ordered set of files committed together in one upload
//! action. Each entry is an [`UploadTask`] identified by its index in the
//! batch (names can collide after a rename). Task state and progress are
//! only mutated by the coordinator; everything else reads them.

mod naming;
mod pending;

pub use naming::{custom_file_name, file_extension};
pub use pending::PendingFiles;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A local file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// File name as sent in the multipart `file` part.
    pub name: String,
    pub size: u64,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
        }
    }

    /// Stat `path` and build a `LocalFile`. Directories and missing files are rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
        if !meta.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        Ok(Self::new(path, name, meta.len()))
    }
}

/// Per-task lifecycle: Pending → InFlight → Done | Failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    InFlight,
    Done,
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Done | TaskState::Failed)
    }
}

/// One file's upload unit within a batch.
#[derive(Debug, Clone)]
pub struct UploadTask {
    index: usize,
    pub file: LocalFile,
    pub custom_name: Option<String>,
    pub description: Option<String>,
    pub(crate) progress: f64,
    pub(crate) state: TaskState,
    pub(crate) file_id: Option<i64>,
    pub(crate) failure: Option<String>,
}

impl UploadTask {
    fn new(index: usize, file: LocalFile, custom_name: Option<String>, description: Option<String>) -> Self {
        Self {
            index,
            file,
            custom_name,
            description,
            progress: 0.0,
            state: TaskState::Pending,
            file_id: None,
            failure: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Percentage in [0, 100].
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Server-assigned id, set once the task is Done.
    pub fn file_id(&self) -> Option<i64> {
        self.file_id
    }

    /// Name shown to the user: the custom name when set, else the local file name.
    pub fn display_name(&self) -> &str {
        self.custom_name.as_deref().unwrap_or(&self.file.name)
    }
}

/// Ordered tasks; indices are `0..len` in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    tasks: Vec<UploadTask>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task; returns its index.
    pub fn push(&mut self, file: LocalFile, custom_name: Option<String>, description: Option<String>) -> usize {
        let index = self.tasks.len();
        self.tasks
            .push(UploadTask::new(index, file, custom_name, description));
        index
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub(crate) fn into_tasks(self) -> Vec<UploadTask> {
        self.tasks
    }
}

impl FromIterator<LocalFile> for Batch {
    fn from_iter<I: IntoIterator<Item = LocalFile>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for file in iter {
            batch.push(file, None, None);
        }
        batch
    }
}
