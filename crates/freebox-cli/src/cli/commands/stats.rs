//! `freebox stats` – server statistics.

use anyhow::Result;
use freebox_core::api::{self, ServerStats};
use freebox_core::events::Event;
use freebox_core::format::{format_file_size, format_uptime};
use url::Url;

use super::{blocking, printer_bus};

pub async fn run_stats(server: &Url) -> Result<()> {
    let (bus, _) = printer_bus();
    let base = server.clone();
    let stats = blocking(move || api::fetch_stats(&base)).await?;
    bus.emit(&Event::StatsUpdated(stats));
    Ok(())
}

pub(super) fn print_stats(stats: &ServerStats) {
    println!("Uptime:          {}", format_uptime(stats.uptime_seconds));
    println!("Visitors:        {}", stats.visitors_count);
    println!("Files stored:    {}", stats.files_count);
    println!("Storage used:    {}", format_file_size(stats.total_storage));
    println!("Total uploads:   {}", stats.total_files_uploaded);
    println!("Total downloads: {}", stats.total_downloads);
    println!("Messages:        {}", stats.messages_count);
    if let Some(ref top) = stats.most_downloaded {
        println!(
            "Most downloaded: {} ({} downloads)",
            top.filename, top.download_count
        );
    }
}
