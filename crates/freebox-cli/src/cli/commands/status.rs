//! `freebox status` – check that the server is reachable.

use anyhow::Result;
use freebox_core::api;
use std::time::Duration;
use url::Url;

use super::blocking;

pub async fn run_status(server: &Url, timeout: Duration) -> Result<()> {
    let base = server.clone();
    let status = blocking(move || api::fetch_status(&base, timeout)).await?;
    let name = status.name.as_deref().unwrap_or("FreeBox");
    if status.is_online() {
        println!("{} at {} is online", name, server);
    } else {
        println!("{} at {} reports status {:?}", name, server, status.status);
    }
    if let Some(ref mode) = status.mode {
        println!("  mode: {mode}");
    }
    match status.recommended_concurrent_uploads {
        Some(n) => println!("  recommended concurrent uploads: {n}"),
        None => println!("  recommended concurrent uploads: (not advertised)"),
    }
    Ok(())
}
