//! `freebox download <id> <output>` – fetch a stored file to disk.

use anyhow::Result;
use freebox_core::api;
use freebox_core::events::Event;
use std::path::PathBuf;
use url::Url;

use super::{blocking, printer_bus};

pub async fn run_download(server: &Url, id: i64, output: PathBuf) -> Result<()> {
    let (bus, _) = printer_bus();
    let base = server.clone();
    let dest = output.clone();
    let bytes = blocking(move || api::download_file(&base, id, &dest)).await?;
    tracing::info!(id, bytes, path = %output.display(), "downloaded file");
    bus.emit(&Event::FileDownloaded {
        id,
        path: output,
        bytes,
    });
    Ok(())
}
