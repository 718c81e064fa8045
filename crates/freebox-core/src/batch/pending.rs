//! Files selected for upload but not yet committed.
//!
//! Entries are keyed by local file name: adding a second file with a name
//! already in the list is skipped. Committing with [`PendingFiles::into_batch`]
//! hands an owned [`Batch`] to the coordinator.

use anyhow::Result;
use std::path::Path;

use super::naming::custom_file_name;
use super::{Batch, LocalFile};

#[derive(Debug, Clone)]
struct PendingEntry {
    file: LocalFile,
    rename_base: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PendingFiles {
    entries: Vec<PendingEntry>,
    global_description: Option<String>,
}

fn non_blank(text: &str) -> Option<String> {
    let t = text.trim();
    (!t.is_empty()).then(|| t.to_string())
}

impl PendingFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stat and add a file from disk. Returns `Ok(false)` when the name is already listed.
    pub fn add(&mut self, path: &Path) -> Result<bool> {
        let file = LocalFile::from_path(path)?;
        Ok(self.add_file(file))
    }

    pub fn add_file(&mut self, file: LocalFile) -> bool {
        if self.contains(&file.name) {
            tracing::debug!(name = %file.name, "skipping duplicate file name");
            return false;
        }
        self.entries.push(PendingEntry {
            file,
            rename_base: None,
            description: None,
        });
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.file.name == name)
    }

    /// Drop a file by name. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.file.name != name);
        self.entries.len() != before
    }

    /// Set the new base name for `name`; the original extension is kept at commit time.
    pub fn rename(&mut self, name: &str, base: &str) -> Result<()> {
        self.entry_mut(name)?.rename_base = Some(base.to_string());
        Ok(())
    }

    pub fn describe(&mut self, name: &str, text: &str) -> Result<()> {
        self.entry_mut(name)?.description = non_blank(text);
        Ok(())
    }

    /// Fallback description for files without their own.
    pub fn set_global_description(&mut self, text: &str) {
        self.global_description = non_blank(text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.file.name.as_str())
    }

    /// Commit the selection. Fails when nothing is selected.
    pub fn into_batch(self) -> Result<Batch> {
        if self.entries.is_empty() {
            anyhow::bail!("no files selected for upload");
        }
        let mut batch = Batch::new();
        for entry in self.entries {
            let custom_name = entry
                .rename_base
                .as_deref()
                .and_then(|base| custom_file_name(&entry.file.name, base));
            let description = entry
                .description
                .or_else(|| self.global_description.clone());
            batch.push(entry.file, custom_name, description);
        }
        Ok(batch)
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut PendingEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.file.name == name)
            .ok_or_else(|| anyhow::anyhow!("{name} is not in the upload list"))
    }
}
