//! `GET /api/stats`: appliance counters.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::http::{self, API_TIMEOUT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MostDownloaded {
    pub id: i64,
    pub filename: String,
    pub download_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerStats {
    #[serde(default)]
    pub uptime_seconds: u64,
    #[serde(default)]
    pub visitors_count: u64,
    #[serde(default)]
    pub files_count: u64,
    #[serde(default)]
    pub messages_count: u64,
    /// Bytes stored on the appliance.
    #[serde(default)]
    pub total_storage: u64,
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub total_files_uploaded: u64,
    #[serde(default)]
    pub most_downloaded: Option<MostDownloaded>,
}

pub fn fetch_stats(server: &Url) -> Result<ServerStats> {
    let url = server.join("api/stats").context("building stats URL")?;
    http::get_json(&url, API_TIMEOUT)
}
