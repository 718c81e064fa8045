//! `freebox delete <id>` – delete a stored file.

use anyhow::Result;
use freebox_core::api;
use freebox_core::events::Event;
use std::sync::atomic::Ordering;
use url::Url;

use super::list::refresh_files;
use super::{blocking, printer_bus};

pub async fn run_delete(server: &Url, id: i64, list_limit: u32) -> Result<()> {
    let (bus, stale) = printer_bus();
    let base = server.clone();
    blocking(move || api::delete_file(&base, id)).await?;
    println!("Deleted file {id}");
    bus.emit(&Event::FilesChanged);

    if stale.load(Ordering::SeqCst) {
        refresh_files(server, list_limit).await?;
    }
    Ok(())
}
