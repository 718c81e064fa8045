//! CLI command handlers. Each command is in its own file.
//!
//! Core calls are blocking (curl), so handlers run them under
//! `spawn_blocking`. Output that follows a server-side change goes through
//! an [`EventBus`] with the printers below subscribed.

mod chat;
mod delete;
mod download;
mod list;
mod stats;
mod status;
mod upload;

pub use chat::run_chat;
pub use delete::run_delete;
pub use download::run_download;
pub use list::run_list;
pub use stats::run_stats;
pub use status::run_status;
pub use upload::{run_upload, UploadOptions};

use anyhow::{Context, Result};
use freebox_core::events::{Event, EventBus, EventKind};
use freebox_core::format::{format_chat_line, format_file_size};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Event bus wired to the CLI's printers. The returned flag turns true once
/// a `FilesChanged` event has been seen, so the caller knows to re-list.
pub(crate) fn printer_bus() -> (Arc<EventBus>, Arc<AtomicBool>) {
    let bus = Arc::new(EventBus::new());
    let stale = Arc::new(AtomicBool::new(false));

    let flag = Arc::clone(&stale);
    bus.on(EventKind::FilesChanged, move |_| flag.store(true, Ordering::SeqCst));
    bus.on(EventKind::FileDownloaded, |event| {
        if let Event::FileDownloaded { id, path, bytes } = event {
            println!("Saved file {} to {} ({})", id, path.display(), format_file_size(*bytes));
        }
    });
    bus.on(EventKind::ChatMessage, |event| {
        if let Event::ChatMessage(message) = event {
            println!("{}", format_chat_line(message));
        }
    });
    bus.on(EventKind::StatsUpdated, |event| {
        if let Event::StatsUpdated(stats) = event {
            stats::print_stats(stats);
        }
    });
    (bus, stale)
}

/// Run a blocking core call off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .context("blocking task panicked")?
}
