//! `freebox list` – show stored files.

use anyhow::Result;
use freebox_core::api::{self, FileRecord};
use freebox_core::format::{file_kind, format_file_size};
use url::Url;

use super::blocking;

pub async fn run_list(server: &Url, limit: u32, offset: u32) -> Result<()> {
    let server = server.clone();
    let files = blocking(move || api::list_files(&server, limit, offset)).await?;
    print_files(&files);
    Ok(())
}

/// Fetch the first page again and print it.
pub(crate) async fn refresh_files(server: &Url, limit: u32) -> Result<()> {
    run_list(server, limit, 0).await
}

fn print_files(files: &[FileRecord]) {
    if files.is_empty() {
        println!("No files uploaded yet.");
        return;
    }
    println!(
        "{:<6} {:<10} {:<6} {:<10} {}",
        "ID", "SIZE", "KIND", "DOWNLOADS", "NAME"
    );
    for f in files {
        let name = match f.description.as_deref().filter(|d| !d.is_empty()) {
            Some(d) => format!("{}  ({})", f.filename, d),
            None => f.filename.clone(),
        };
        println!(
            "{:<6} {:<10} {:<6} {:<10} {}",
            f.id,
            format_file_size(f.size),
            file_kind(&f.filename).label(),
            f.download_count,
            name
        );
    }
}
