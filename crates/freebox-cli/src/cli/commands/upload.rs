//! `freebox upload <files>...` – upload files as one batch.

use anyhow::Result;
use freebox_core::batch::PendingFiles;
use freebox_core::config::FreeboxConfig;
use freebox_core::coordinator::BatchProgress;
use freebox_core::events::BusNotifier;
use freebox_core::format::format_progress;
use freebox_core::upload::run_batch;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use super::list::refresh_files;
use super::{blocking, printer_bus};

const PROGRESS_INTERVAL_MS: u128 = 500;

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub files: Vec<PathBuf>,
    /// `(file, new base name)`; `file` may be a path or a bare file name.
    pub renames: Vec<(String, String)>,
    pub descriptions: Vec<(String, String)>,
    pub description: Option<String>,
}

pub async fn run_upload(cfg: &FreeboxConfig, server: &Url, opts: UploadOptions) -> Result<()> {
    let batch = build_pending(&opts)?.into_batch()?;
    println!("Uploading {} file(s) to {}", batch.len(), server);

    let (bus, stale) = printer_bus();
    let (progress_tx, mut progress_rx) = tokio::sync::watch::channel(BatchProgress::default());
    let progress_handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        // Ends once the driver drops the sender and the last snapshot is seen.
        while progress_rx.changed().await.is_ok() {
            let p = progress_rx.borrow_and_update().clone();
            let due = last_print
                .map(|t| t.elapsed().as_millis() >= PROGRESS_INTERVAL_MS)
                .unwrap_or(true);
            if due || p.finished {
                println!("  {}", format_progress(&p));
                last_print = Some(Instant::now());
            }
        }
    });

    let cfg = cfg.clone();
    let base = server.clone();
    let notifier = BusNotifier::new(Arc::clone(&bus));
    let list_limit = cfg.list_limit;
    let report = blocking(move || {
        run_batch(
            &cfg,
            &base,
            batch,
            Box::new(|message: &str| eprintln!("  {}", message)),
            Box::new(notifier),
            Some(progress_tx),
        )
    })
    .await?;
    let _ = progress_handle.await;

    println!(
        "{} uploaded, {} failed",
        report.uploaded.len(),
        report.failed.len()
    );
    if stale.load(Ordering::SeqCst) {
        refresh_files(server, list_limit).await?;
    }
    Ok(())
}

fn build_pending(opts: &UploadOptions) -> Result<PendingFiles> {
    let mut pending = PendingFiles::new();
    for path in &opts.files {
        if !pending.add(path)? {
            println!(
                "Skipping {}: a file with that name is already selected",
                path.display()
            );
        }
    }
    for (file, base) in &opts.renames {
        pending.rename(&listed_name(file), base)?;
    }
    for (file, text) in &opts.descriptions {
        pending.describe(&listed_name(file), text)?;
    }
    if let Some(ref text) = opts.description {
        pending.set_global_description(text);
    }
    Ok(pending)
}

/// Pending entries are keyed by file name; accept a path too.
fn listed_name(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}
